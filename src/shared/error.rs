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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, MaintenanceError>;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Metadata error in {path}: {message}")]
    MetadataError { path: String, message: String },

    #[error("HCL error: {0}")]
    HclError(String),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Container error: {0}")]
    ContainerError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<MaintenanceError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<tera::Error> for MaintenanceError {
    fn from(err: tera::Error) -> Self {
        // tera keeps the useful part of the message in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        MaintenanceError::TemplateError(message)
    }
}

impl From<hcl::Error> for MaintenanceError {
    fn from(err: hcl::Error) -> Self {
        MaintenanceError::HclError(err.to_string())
    }
}

impl From<hcl::eval::Error> for MaintenanceError {
    fn from(err: hcl::eval::Error) -> Self {
        MaintenanceError::HclError(err.to_string())
    }
}

impl From<hcl::eval::Errors> for MaintenanceError {
    fn from(err: hcl::eval::Errors) -> Self {
        MaintenanceError::HclError(err.to_string())
    }
}

impl From<kube::config::KubeconfigError> for MaintenanceError {
    fn from(err: kube::config::KubeconfigError) -> Self {
        MaintenanceError::ConfigError(format!("invalid kubeconfig: {}", err))
    }
}

impl MaintenanceError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Self::ValidationError(context.into())
    }

    pub fn metadata(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MetadataError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Prefix the error with the step that was running when it happened.
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_inner_message() {
        let err = MaintenanceError::validation("versions array cannot be empty")
            .wrap("while scaffolding pgvector");
        assert_eq!(
            err.to_string(),
            "while scaffolding pgvector: Validation error: versions array cannot be empty"
        );
    }
}
