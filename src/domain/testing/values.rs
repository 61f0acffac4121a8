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

//! Chainsaw values describing the extension under test.
//!
//! Fields are declared in alphabetical order so the rendered `values.yaml`
//! keeps a stable key order.

use crate::domain::config::Settings;
use crate::domain::extension::{
    default_extension_image, parse_extension_metadata, ExtensionMetadata,
};
use crate::infrastructure::constants::{
    ANNOTATION_BASE_IMAGE, ANNOTATION_IMAGE_VERSION, METADATA_FILE, VALUES_FILE,
};
use crate::infrastructure::registry::ImageRegistry;
use crate::shared::error::{MaintenanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingValues {
    pub extensions: Vec<TestingExtension>,
    pub name: String,
    pub pg_image: String,
    pub shared_preload_libraries: Vec<String>,
    pub sql_name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingExtension {
    pub dynamic_library_path: Vec<String>,
    pub extension_control_path: Vec<String>,
    pub image: TestingImage,
    pub ld_library_path: Vec<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingImage {
    pub reference: String,
}

impl TestingExtension {
    fn new(metadata: &ExtensionMetadata, reference: String) -> Self {
        Self {
            dynamic_library_path: metadata.dynamic_library_path.clone(),
            extension_control_path: metadata.extension_control_path.clone(),
            image: TestingImage { reference },
            ld_library_path: metadata.ld_library_path.clone(),
            name: metadata.name.clone(),
        }
    }
}

/// The extension itself first, then each required extension with its default image.
pub fn testing_extensions(
    settings: &Settings,
    source: &Path,
    metadata: &ExtensionMetadata,
    extension_image: &str,
) -> Result<Vec<TestingExtension>> {
    let mut extensions = vec![TestingExtension::new(metadata, extension_image.to_string())];

    for dependency in &metadata.required_extensions {
        let dir = source.join(dependency);
        if !dir.join(METADATA_FILE).is_file() {
            return Err(MaintenanceError::NotFound(format!(
                "required dependency \"{}\" not found",
                dependency
            )));
        }
        let dependency_metadata = parse_extension_metadata(&dir)?;
        let image = default_extension_image(settings, &dependency_metadata)?;
        extensions.push(TestingExtension::new(&dependency_metadata, image));
    }

    Ok(extensions)
}

fn required_annotation(
    annotations: &BTreeMap<String, String>,
    key: &str,
    image: &str,
) -> Result<String> {
    annotations
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| {
            MaintenanceError::validation(format!(
                "extension image {} doesn't have an '{}' annotation",
                image, key
            ))
        })
}

pub async fn build_testing_values(
    registry: &dyn ImageRegistry,
    settings: &Settings,
    source: &Path,
    target_dir: &Path,
    extension_image: Option<&str>,
) -> Result<TestingValues> {
    let metadata = parse_extension_metadata(target_dir)?;

    let image = match extension_image {
        Some(image) if !image.is_empty() => image.to_string(),
        _ => default_extension_image(settings, &metadata)?,
    };
    debug!("Reading annotations of {}", image);

    let annotations = registry.annotations(&image).await?;
    let pg_image = required_annotation(&annotations, ANNOTATION_BASE_IMAGE, &image)?;
    let version = required_annotation(&annotations, ANNOTATION_IMAGE_VERSION, &image)?;

    Ok(TestingValues {
        extensions: testing_extensions(settings, source, &metadata, &image)?,
        name: metadata.name.clone(),
        pg_image,
        shared_preload_libraries: metadata.shared_preload_libraries.clone(),
        sql_name: metadata.sql_name.clone(),
        version,
    })
}

/// Write `<target_dir>/values.yaml`.
pub async fn generate_testing_values(
    registry: &dyn ImageRegistry,
    settings: &Settings,
    source: &Path,
    target_dir: &Path,
    extension_image: Option<&str>,
) -> Result<PathBuf> {
    let values =
        build_testing_values(registry, settings, source, target_dir, extension_image).await?;

    let path = target_dir.join(VALUES_FILE);
    std::fs::write(&path, serde_yaml::to_string(&values)?)?;
    info!("Wrote {}", path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_key_order() {
        let values = TestingValues {
            extensions: vec![TestingExtension {
                dynamic_library_path: vec![],
                extension_control_path: vec![],
                image: TestingImage {
                    reference: "ghcr.io/cloudnative-pg/pgvector:0.8.1-18-trixie".to_string(),
                },
                ld_library_path: vec![],
                name: "pgvector".to_string(),
            }],
            name: "pgvector".to_string(),
            pg_image: "ghcr.io/cloudnative-pg/postgresql:18-minimal-trixie".to_string(),
            shared_preload_libraries: vec![],
            sql_name: "vector".to_string(),
            version: "0.8.1".to_string(),
        };

        let yaml = serde_yaml::to_string(&values).unwrap();
        let keys: Vec<&str> = yaml
            .lines()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(
            keys,
            vec![
                "extensions",
                "name",
                "pg_image",
                "shared_preload_libraries",
                "sql_name",
                "version"
            ]
        );
        assert!(yaml.contains("shared_preload_libraries: []"));
    }

    #[test]
    fn test_missing_annotation() {
        let annotations = BTreeMap::from([(
            ANNOTATION_IMAGE_VERSION.to_string(),
            "0.8.1".to_string(),
        )]);
        let err = required_annotation(&annotations, ANNOTATION_BASE_IMAGE, "img").unwrap_err();
        assert!(err
            .to_string()
            .contains("doesn't have an 'io.cloudnativepg.image.base.name' annotation"));
    }
}
