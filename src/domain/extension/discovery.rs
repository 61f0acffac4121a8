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

use super::metadata::{parse_extension_metadata, ExtensionMetadata};
use crate::infrastructure::constants::{METADATA_FILE, README_FILE, TARGET_ALL};
use crate::shared::error::{MaintenanceError, Result};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use tracing::trace;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionFilter {
    #[default]
    All,
    /// Only extensions with `auto_update_os_libs = true`
    OsLibs,
    /// Only extensions shipping a README.md
    Readme,
}

impl ExtensionFilter {
    fn matches(&self, dir: &Path, metadata: &ExtensionMetadata) -> bool {
        match self {
            ExtensionFilter::All => true,
            ExtensionFilter::OsLibs => metadata.auto_update_os_libs,
            ExtensionFilter::Readme => dir.join(README_FILE).is_file(),
        }
    }
}

/// Extension selection passed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Extension(String),
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('/');
        if raw == TARGET_ALL {
            Target::All
        } else {
            Target::Extension(raw.to_string())
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => write!(f, "{}", TARGET_ALL),
            Target::Extension(dir) => write!(f, "{}", dir),
        }
    }
}

/// Directories below `source` holding a metadata file, as sorted `/` separated relative paths.
pub fn extension_directories(source: &Path, ignore: &[String]) -> Result<Vec<String>> {
    if !source.is_dir() {
        return Err(MaintenanceError::NotFound(format!(
            "source directory {}",
            source.display()
        )));
    }

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && ignore
                    .iter()
                    .any(|name| entry.file_name().to_string_lossy() == name.as_str()))
        });

    let mut directories = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| MaintenanceError::Io(e.into()))?;
        if !entry.file_type().is_file() || entry.file_name() != OsStr::new(METADATA_FILE) {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let Ok(relative) = dir.strip_prefix(source) else {
            continue;
        };
        // A metadata file at the root is not an extension
        if relative.as_os_str().is_empty() {
            continue;
        }
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        trace!("Found extension directory {}", relative);
        directories.push(relative);
    }

    directories.sort();
    Ok(directories)
}

/// Parse every extension below `source` that passes `filter`, keyed by directory.
pub fn get_extensions(
    source: &Path,
    ignore: &[String],
    filter: ExtensionFilter,
) -> Result<BTreeMap<String, ExtensionMetadata>> {
    let mut extensions = BTreeMap::new();
    for dir in extension_directories(source, ignore)? {
        let path = source.join(&dir);
        let metadata = parse_extension_metadata(&path)?;
        if filter.matches(&path, &metadata) {
            extensions.insert(dir, metadata);
        }
    }
    Ok(extensions)
}

/// Check that a single target is an extension directory.
pub fn resolve_target(source: &Path, target: &str) -> Result<Target> {
    match Target::parse(target) {
        Target::All => Ok(Target::All),
        Target::Extension(dir) => {
            if !source.join(&dir).join(METADATA_FILE).is_file() {
                return Err(MaintenanceError::validation(format!(
                    "not a valid target, metadata.hcl file is missing. Target: {}",
                    dir
                )));
            }
            Ok(Target::Extension(dir))
        }
    }
}

/// Extensions selected by `target`, after applying `filter` when every extension is targeted.
pub fn select_extensions(
    source: &Path,
    ignore: &[String],
    target: &Target,
    filter: ExtensionFilter,
) -> Result<BTreeMap<String, ExtensionMetadata>> {
    match target {
        Target::All => get_extensions(source, ignore, filter),
        Target::Extension(dir) => {
            let metadata = parse_extension_metadata(&source.join(dir))?;
            Ok(BTreeMap::from([(dir.clone(), metadata)]))
        }
    }
}
