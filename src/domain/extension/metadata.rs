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

//! Extension metadata, decoded from the `metadata = { ... }` attribute of `metadata.hcl`

use crate::infrastructure::constants::{METADATA_FILE, PACKAGE_VERSION_PLACEHOLDER};
use crate::shared::error::{MaintenanceError, Result};
use hcl::eval::{Context, Evaluate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// distribution -> postgres major -> Debian package version
pub type VersionMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtensionMetadata {
    pub name: String,
    pub sql_name: String,
    pub image_name: String,
    #[serde(default)]
    pub shared_preload_libraries: Vec<String>,
    #[serde(default)]
    pub extension_control_path: Vec<String>,
    #[serde(default)]
    pub dynamic_library_path: Vec<String>,
    #[serde(default)]
    pub ld_library_path: Vec<String>,
    #[serde(default)]
    pub auto_update_os_libs: bool,
    #[serde(default)]
    pub required_extensions: Vec<String>,
    #[serde(default)]
    pub create_extension: bool,
    #[serde(default)]
    pub versions: VersionMap,
    /// Debian package name, `%version%` standing for the postgres major
    #[serde(default)]
    pub package: Option<String>,
}

impl ExtensionMetadata {
    /// Debian package installed for the given postgres major.
    pub fn package_name(&self, major: &str) -> String {
        match self.package.as_deref() {
            Some(pattern) if !pattern.is_empty() => {
                pattern.replace(PACKAGE_VERSION_PLACEHOLDER, major)
            }
            _ => format!("postgresql-{}-{}", major, self.name),
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("sql_name", &self.sql_name),
            ("image_name", &self.image_name),
        ] {
            if value.trim().is_empty() {
                return Err(MaintenanceError::validation(format!(
                    "metadata.{} cannot be empty",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// Parse `<dir>/metadata.hcl`.
pub fn parse_extension_metadata(dir: &Path) -> Result<ExtensionMetadata> {
    let path = dir.join(METADATA_FILE);
    if !path.is_file() {
        return Err(MaintenanceError::metadata(
            dir.display().to_string(),
            "metadata.hcl file is missing",
        ));
    }

    let content = std::fs::read_to_string(&path)?;
    parse_metadata_str(&content)
        .map_err(|e| MaintenanceError::metadata(path.display().to_string(), e.to_string()))
}

/// Decode metadata from HCL text. Attributes other than `metadata` are ignored.
pub fn parse_metadata_str(content: &str) -> Result<ExtensionMetadata> {
    let body = hcl::parse(content)?;

    let attribute = body
        .attributes()
        .find(|attr| attr.key() == "metadata")
        .ok_or_else(|| MaintenanceError::HclError("missing `metadata` attribute".to_string()))?;

    let value = attribute.expr().evaluate(&Context::new())?;
    let metadata: ExtensionMetadata = serde_json::from_value(serde_json::to_value(&value)?)?;
    metadata.validate()?;

    Ok(metadata)
}
