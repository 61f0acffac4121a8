// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::config::Settings;
use crate::domain::extension::{
    default_extension_image, parse_extension_metadata, select_extensions, ExtensionFilter,
    ExtensionMetadata, Target,
};
use crate::infrastructure::constants::README_FILE;
use crate::shared::error::{MaintenanceError, Result};
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Point every default image reference of the README at the current version.
///
/// The repository part may be spelled with the image name or the extension name.
pub fn rewrite_readme(
    settings: &Settings,
    metadata: &ExtensionMetadata,
    content: &str,
) -> Result<String> {
    let image = default_extension_image(settings, metadata)?;

    let mut repositories = vec![regex::escape(&metadata.image_name)];
    if metadata.name != metadata.image_name {
        repositories.push(regex::escape(&metadata.name));
    }
    let pattern = format!(
        r"({}/(?:{}):)(\d+(?:\.\d+)+)-{}-{}",
        regex::escape(&settings.image_prefix()),
        repositories.join("|"),
        settings.defaults.pg_major,
        regex::escape(&settings.defaults.distribution)
    );
    let re = Regex::new(&pattern)?;

    Ok(re.replace_all(content, NoExpand(&image)).into_owned())
}

/// Update `<dir>/README.md`, returning whether it changed.
pub fn update_readme(settings: &Settings, dir: &Path) -> Result<bool> {
    let metadata = parse_extension_metadata(dir)?;
    let path = dir.join(README_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        MaintenanceError::NotFound(format!("README file {}: {}", path.display(), e))
    })?;

    let updated = rewrite_readme(settings, &metadata, &content)?;
    if updated == content {
        debug!("{} already up to date", path.display());
        return Ok(false);
    }

    std::fs::write(&path, updated)?;
    info!("Updated {}", path.display());
    Ok(true)
}

/// Update the README of every extension selected by `target`; returns the changed files.
pub fn update_readmes(settings: &Settings, source: &Path, target: &Target) -> Result<Vec<PathBuf>> {
    let extensions = select_extensions(
        source,
        &settings.discovery.ignore,
        target,
        ExtensionFilter::Readme,
    )?;

    let mut changed = Vec::new();
    for dir in extensions.keys() {
        let path = source.join(dir);
        if update_readme(settings, &path)
            .map_err(|e| e.wrap(format!("while updating README of {}", dir)))?
        {
            changed.push(path.join(README_FILE));
        }
    }
    Ok(changed)
}

/// Sorted extension directories that ship a README.
pub fn readme_targets(settings: &Settings, source: &Path) -> Result<Vec<String>> {
    Ok(select_extensions(
        source,
        &settings.discovery.ignore,
        &Target::All,
        ExtensionFilter::Readme,
    )?
    .into_keys()
    .collect())
}
