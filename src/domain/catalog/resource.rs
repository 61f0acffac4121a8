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

use crate::domain::extension::ExtensionMetadata;
use crate::infrastructure::constants::LABEL_IMAGE_OS;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// CloudNativePG `ClusterImageCatalog` spec
#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[kube(
    group = "postgresql.cnpg.io",
    version = "v1",
    kind = "ClusterImageCatalog",
    plural = "clusterimagecatalogs"
)]
pub struct ClusterImageCatalogSpec {
    #[serde(default)]
    pub images: Vec<CatalogImage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct CatalogImage {
    pub major: i64,
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionConfiguration>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ExtensionConfiguration {
    pub name: String,
    pub image: ImageVolumeSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_control_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_library_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ld_library_path: Vec<String>,
}

impl ExtensionConfiguration {
    pub fn from_metadata(metadata: &ExtensionMetadata, reference: impl Into<String>) -> Self {
        Self {
            name: metadata.name.clone(),
            image: ImageVolumeSource {
                reference: reference.into(),
                pull_policy: None,
            },
            extension_control_path: metadata.extension_control_path.clone(),
            dynamic_library_path: metadata.dynamic_library_path.clone(),
            ld_library_path: metadata.ld_library_path.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageVolumeSource {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<String>,
}

impl ClusterImageCatalog {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(key))
            .map(|v| v.as_str())
    }

    pub fn os(&self) -> Option<&str> {
        self.label(LABEL_IMAGE_OS)
    }
}

impl CatalogImage {
    /// Add an extension, replacing one with the same name and keeping the list sorted.
    pub fn upsert_extension(&mut self, configuration: ExtensionConfiguration) {
        self.extensions.retain(|e| e.name != configuration.name);
        self.extensions.push(configuration);
        self.extensions.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
