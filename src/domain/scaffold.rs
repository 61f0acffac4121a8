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

//! Scaffolding of new extension directories from Tera templates.
//!
//! The templates directory must provide `metadata.hcl.tmpl`, `Dockerfile.tmpl`
//! and `README.md.tmpl`. They are rendered with [`ScaffoldContext`].

use crate::domain::config::Settings;
use crate::infrastructure::constants::{PACKAGE_VERSION_PLACEHOLDER, SCAFFOLD_FILES, TEMPLATE_EXTENSION};
use crate::shared::error::{MaintenanceError, Result};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldRequest {
    pub name: String,
    pub versions: Vec<String>,
    pub distros: Vec<String>,
    /// Debian package, `%version%` standing for the postgres major
    pub package_name: Option<String>,
}

impl ScaffoldRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(MaintenanceError::validation("name cannot be empty"));
        }
        let pattern = Regex::new(r"^[a-z0-9_-]+$")?;
        if !pattern.is_match(&self.name) {
            return Err(MaintenanceError::validation(format!(
                "invalid extension name: {} (must contain only lowercase alphanumeric characters, hyphens, and underscores)",
                self.name
            )));
        }
        if self.versions.is_empty() {
            return Err(MaintenanceError::validation("versions array cannot be empty"));
        }
        if self.distros.is_empty() {
            return Err(MaintenanceError::validation("distros array cannot be empty"));
        }
        Ok(())
    }

    pub fn package(&self) -> String {
        match self.package_name.as_deref() {
            Some(package) if !package.is_empty() => package.to_string(),
            _ => format!("postgresql-{}-{}", PACKAGE_VERSION_PLACEHOLDER, self.name),
        }
    }
}

/// Variables available to the templates
#[derive(Debug, Clone, Serialize)]
pub struct ScaffoldContext {
    pub name: String,
    pub versions: Vec<String>,
    pub distros: Vec<String>,
    pub package: String,
    pub default_version: u32,
    pub default_distro: String,
}

impl ScaffoldContext {
    pub fn new(settings: &Settings, request: &ScaffoldRequest) -> Self {
        Self {
            name: request.name.clone(),
            versions: request.versions.clone(),
            distros: request.distros.clone(),
            package: request.package(),
            default_version: settings.defaults.pg_major,
            default_distro: settings.defaults.distribution.clone(),
        }
    }
}

/// Render every scaffold file, returning `(file name, content)` pairs.
pub fn render_extension(
    settings: &Settings,
    templates_dir: &Path,
    request: &ScaffoldRequest,
) -> Result<Vec<(String, String)>> {
    request.validate()?;

    let mut tera = Tera::default();
    for file in SCAFFOLD_FILES {
        let template = format!("{}{}", file, TEMPLATE_EXTENSION);
        let path = templates_dir.join(&template);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            MaintenanceError::NotFound(format!("required template file {} not found: {}", template, e))
        })?;
        tera.add_raw_template(file, &content)
            .map_err(|e| MaintenanceError::from(e).wrap(format!("failed to parse template {}", template)))?;
    }

    let context = tera::Context::from_serialize(ScaffoldContext::new(settings, request))?;

    SCAFFOLD_FILES
        .iter()
        .map(|file| {
            debug!("Rendering template {}{}", file, TEMPLATE_EXTENSION);
            let rendered = tera.render(file, &context).map_err(|e| {
                MaintenanceError::from(e)
                    .wrap(format!("failed to execute template {}{}", file, TEMPLATE_EXTENSION))
            })?;
            Ok((file.to_string(), rendered))
        })
        .collect()
}

/// Render the scaffold into `<output_dir>/<name>/`.
pub fn create_extension(
    settings: &Settings,
    templates_dir: &Path,
    request: &ScaffoldRequest,
    output_dir: &Path,
    force: bool,
) -> Result<Vec<PathBuf>> {
    let rendered = render_extension(settings, templates_dir, request)?;
    let extension_dir = output_dir.join(&request.name);

    if !force {
        if let Some(existing) = rendered
            .iter()
            .map(|(file, _)| extension_dir.join(file))
            .find(|path| path.exists())
        {
            return Err(MaintenanceError::validation(format!(
                "{} already exists, use --force to overwrite",
                existing.display()
            )));
        }
    }

    std::fs::create_dir_all(&extension_dir)?;
    let mut written = Vec::with_capacity(rendered.len());
    for (file, content) in rendered {
        let path = extension_dir.join(file);
        std::fs::write(&path, content)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn request(name: &str) -> ScaffoldRequest {
        ScaffoldRequest {
            name: name.to_string(),
            versions: vec!["18".to_string()],
            distros: vec!["trixie".to_string(), "bookworm".to_string()],
            package_name: None,
        }
    }

    fn templates() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("metadata.hcl.tmpl"),
            "name = \"{{ name }}\"\npackage = \"{{ package }}\"\n{% for d in distros %}{{ d }}:{% for v in versions %}{{ v }}{% endfor %}\n{% endfor %}",
        )
        .unwrap();
        fs::write(
            dir.path().join("Dockerfile.tmpl"),
            "FROM postgresql:{{ default_version }}-minimal-{{ default_distro }}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("README.md.tmpl"),
            "# {{ name | replace(from=\"_\", to=\" \") | title }}\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_validation() {
        assert!(request("pg_ivm").validate().is_ok());
        assert!(request("").validate().is_err());
        assert!(request("PgVector").validate().is_err());
        assert!(request("pg vector").validate().is_err());

        let mut no_versions = request("pgvector");
        no_versions.versions.clear();
        assert!(no_versions
            .validate()
            .unwrap_err()
            .to_string()
            .contains("versions array cannot be empty"));
    }

    #[test]
    fn test_default_package() {
        assert_eq!(request("pgaudit").package(), "postgresql-%version%-pgaudit");
    }

    #[test]
    fn test_render() {
        let dir = templates();
        let rendered = render_extension(&Settings::default(), dir.path(), &request("pg_ivm")).unwrap();

        assert_eq!(rendered[0].0, "metadata.hcl");
        assert_eq!(
            rendered[0].1,
            "name = \"pg_ivm\"\npackage = \"postgresql-%version%-pg_ivm\"\ntrixie:18\nbookworm:18\n"
        );
        assert_eq!(rendered[1].1, "FROM postgresql:18-minimal-trixie\n");
        assert_eq!(rendered[2].1, "# Pg Ivm\n");
    }

    #[test]
    fn test_missing_template() {
        let dir = templates();
        fs::remove_file(dir.path().join("Dockerfile.tmpl")).unwrap();

        let err = render_extension(&Settings::default(), dir.path(), &request("pgvector")).unwrap_err();
        assert!(err
            .to_string()
            .contains("required template file Dockerfile.tmpl not found"));
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let dir = templates();
        let out = tempfile::tempdir().unwrap();
        let settings = Settings::default();

        let written = create_extension(&settings, dir.path(), &request("pgvector"), out.path(), false).unwrap();
        assert_eq!(written.len(), 3);
        assert!(out.path().join("pgvector/Dockerfile").is_file());

        assert!(create_extension(&settings, dir.path(), &request("pgvector"), out.path(), false).is_err());
        assert!(create_extension(&settings, dir.path(), &request("pgvector"), out.path(), true).is_ok());
    }
}
