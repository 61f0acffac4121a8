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

//! Tool settings, loaded from an optional TOML file

use crate::infrastructure::constants::*;
use crate::shared::error::{MaintenanceError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

/// Environment variable pointing at the settings file
pub const CONFIG_ENV_VAR: &str = "PGEXT_MAINT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub registry: RegistrySettings,
    pub defaults: DefaultSettings,
    pub distributions: DistributionSettings,
    pub discovery: DiscoverySettings,
    pub container: ContainerSettings,
    pub testing: TestingSettings,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            MaintenanceError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the given path, then `PGEXT_MAINT_CONFIG`, then built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(env_path) if !env_path.is_empty() => Self::from_file(env_path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.registry.host.is_empty() {
            return Err(MaintenanceError::config_error("registry.host cannot be empty"));
        }
        if self.distributions.supported.is_empty() {
            return Err(MaintenanceError::config_error(
                "distributions.supported cannot be empty",
            ));
        }
        if self.container.parallelism == 0 {
            return Err(MaintenanceError::config_error(
                "container.parallelism must be > 0",
            ));
        }
        Ok(())
    }

    /// `<host>/<namespace>` prefix every extension image lives under
    pub fn image_prefix(&self) -> String {
        if self.registry.namespace.is_empty() {
            self.registry.host.clone()
        } else {
            format!("{}/{}", self.registry.host, self.registry.namespace)
        }
    }

    /// Minimal postgres image the package manager runs in
    pub fn postgres_base_image(&self, major: &str, distribution: &str) -> String {
        format!(
            "{}/{}:{}-{}-{}",
            self.image_prefix(),
            POSTGRES_IMAGE_NAME,
            major,
            MINIMAL_IMAGE_FLAVOR,
            distribution
        )
    }

    pub fn is_supported_distribution(&self, distribution: &str) -> bool {
        self.distributions
            .supported
            .iter()
            .any(|d| d == distribution)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistrySettings {
    pub host: String,
    pub namespace: String,
    pub username: Option<String>,
    /// Talk plain HTTP, for local registries without TLS
    pub insecure: bool,
    pub retries: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_REGISTRY_HOST.to_string(),
            namespace: DEFAULT_REGISTRY_NAMESPACE.to_string(),
            username: None,
            insecure: false,
            retries: DEFAULT_REGISTRY_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefaultSettings {
    pub pg_major: u32,
    pub distribution: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            pg_major: DEFAULT_PG_MAJOR,
            distribution: DEFAULT_DISTRIBUTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DistributionSettings {
    pub supported: Vec<String>,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            supported: DEFAULT_SUPPORTED_DISTRIBUTIONS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoverySettings {
    pub ignore: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContainerSettings {
    pub runtime: String,
    pub network: Option<String>,
    pub parallelism: usize,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_CONTAINER_RUNTIME.to_string(),
            network: None,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TestingSettings {
    pub chainsaw_image: String,
}

impl Default for TestingSettings {
    fn default() -> Self {
        Self {
            chainsaw_image: DEFAULT_CHAINSAW_IMAGE.to_string(),
        }
    }
}
