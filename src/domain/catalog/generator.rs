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

use super::resource::{ClusterImageCatalog, ExtensionConfiguration};
use crate::domain::config::Settings;
use crate::domain::extension::{
    extension_image_with_timestamp, get_extensions, parse_build_matrix, ExtensionFilter,
};
use crate::infrastructure::constants::{
    CATALOG_KIND, CATALOG_OUTPUT_PREFIX, IMAGE_TYPE_MINIMAL, LABEL_IMAGE_TYPE,
};
use crate::infrastructure::registry::ImageRegistry;
use crate::shared::error::{MaintenanceError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A base catalog together with the file it came from.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    pub file: String,
    pub os: String,
    pub catalog: ClusterImageCatalog,
}

#[derive(Deserialize)]
struct KindHeader {
    #[serde(default)]
    kind: String,
}

/// Minimal `ClusterImageCatalog`s of supported distributions found in `dir`, sorted by file name.
pub fn load_minimal_catalogs(dir: &Path, supported: &[String]) -> Result<Vec<SourceCatalog>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| {
            MaintenanceError::NotFound(format!("catalogs directory {}: {}", dir.display(), e))
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
        })
        .collect();
    files.sort();

    let mut catalogs = Vec::new();
    for path in files {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| MaintenanceError::from(e).wrap(format!("while retrieving {}", file)))?;

        let header: KindHeader = serde_yaml::from_str(&content)
            .map_err(|e| MaintenanceError::from(e).wrap(format!("while decoding {}", file)))?;
        if header.kind != CATALOG_KIND {
            debug!("Skipping {}: kind {}", file, header.kind);
            continue;
        }

        let catalog: ClusterImageCatalog = serde_yaml::from_str(&content)
            .map_err(|e| MaintenanceError::from(e).wrap(format!("while decoding {}", file)))?;

        if catalog.label(LABEL_IMAGE_TYPE) != Some(IMAGE_TYPE_MINIMAL) {
            debug!("Skipping {}: not a minimal catalog", file);
            continue;
        }

        let os = catalog
            .os()
            .ok_or_else(|| {
                MaintenanceError::validation(format!("while retrieving OS for \"{}\" catalog", file))
            })?
            .to_string();
        if !supported.iter().any(|d| *d == os) {
            debug!("Skipping {}: distribution {} is not supported", file, os);
            continue;
        }

        catalogs.push(SourceCatalog { file, os, catalog });
    }

    Ok(catalogs)
}

/// Add every extension of `source` to the minimal catalogs found in `catalogs_dir`.
pub async fn generate_catalogs(
    registry: &dyn ImageRegistry,
    settings: &Settings,
    source: &Path,
    catalogs_dir: &Path,
) -> Result<Vec<SourceCatalog>> {
    let mut catalogs = load_minimal_catalogs(catalogs_dir, &settings.distributions.supported)
        .map_err(|e| e.wrap("while retrieving base catalogs"))?;

    let extensions = get_extensions(source, &settings.discovery.ignore, ExtensionFilter::All)
        .map_err(|e| e.wrap("while retrieving extensions"))?;
    if extensions.is_empty() {
        return Err(MaintenanceError::NotFound(
            "no extensions found in source directory".to_string(),
        ));
    }

    let mut matrices = Vec::with_capacity(extensions.len());
    for (dir, metadata) in &extensions {
        let matrix = parse_build_matrix(source, dir).map_err(|e| {
            e.wrap(format!(
                "while parsing build matrix for extension {}",
                metadata.name
            ))
        })?;
        matrices.push((metadata, matrix));
    }

    for source_catalog in catalogs.iter_mut() {
        let os = source_catalog.os.clone();
        for (metadata, matrix) in &matrices {
            if !matrix.contains_distribution(&os) {
                continue;
            }

            for image in source_catalog.catalog.spec.images.iter_mut() {
                let major = image.major.to_string();
                if !matrix.contains_major(&major) {
                    continue;
                }

                let reference =
                    extension_image_with_timestamp(registry, settings, metadata, &os, &major)
                        .await
                        .map_err(|e| {
                            e.wrap(format!("while retrieving extension {} image", metadata.name))
                        })?;
                debug!("Adding {} to {} catalog, major {}", reference, os, major);

                image.upsert_extension(ExtensionConfiguration::from_metadata(metadata, reference));
            }
        }
    }

    if catalogs.is_empty() {
        return Err(MaintenanceError::NotFound(
            "no catalogs matched the selection criteria".to_string(),
        ));
    }

    Ok(catalogs)
}

pub fn catalog_file_name(os: &str) -> String {
    format!("{}{}.yaml", CATALOG_OUTPUT_PREFIX, os)
}

pub fn write_catalog(catalog: &SourceCatalog, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let name = catalog.catalog.metadata.name.clone().unwrap_or_default();
    let content = serde_yaml::to_string(&catalog.catalog)
        .map_err(|e| MaintenanceError::from(e).wrap(format!("while encoding catalog {}", name)))?;

    let path = output_dir.join(catalog_file_name(&catalog.os));
    std::fs::write(&path, content)
        .map_err(|e| MaintenanceError::from(e).wrap(format!("while writing catalog {}", name)))?;
    info!("Wrote {}", path.display());

    Ok(path)
}
