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

//! Extension image references

use super::metadata::{ExtensionMetadata, VersionMap};
use crate::domain::config::Settings;
use crate::infrastructure::registry::ImageRegistry;
use crate::shared::error::{MaintenanceError, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

const TAG_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Leading dotted version of the package built for `distribution` / `pg_major`.
pub fn extract_extension_version(
    versions: &VersionMap,
    distribution: &str,
    pg_major: &str,
) -> Result<String> {
    let package_version = versions
        .get(distribution)
        .and_then(|majors| majors.get(pg_major))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            MaintenanceError::NotFound(format!(
                "no package version found for distribution \"{}\" and version {}",
                distribution, pg_major
            ))
        })?;

    let re = Regex::new(r"^(\d+(?:\.\d+)+)")?;
    re.captures(package_version)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            MaintenanceError::validation(format!(
                "cannot extract extension version from \"{}\"",
                package_version
            ))
        })
}

pub fn extension_image(
    settings: &Settings,
    metadata: &ExtensionMetadata,
    distribution: &str,
    pg_major: &str,
) -> Result<String> {
    let version = extract_extension_version(&metadata.versions, distribution, pg_major)
        .map_err(|e| e.wrap(format!("while extracting extension version for {}", metadata.name)))?;

    Ok(format!(
        "{}/{}:{}-{}-{}",
        settings.image_prefix(),
        metadata.image_name,
        version,
        pg_major,
        distribution
    ))
}

/// Image for the configured default distribution and postgres major.
pub fn default_extension_image(settings: &Settings, metadata: &ExtensionMetadata) -> Result<String> {
    extension_image(
        settings,
        metadata,
        &settings.defaults.distribution,
        &settings.defaults.pg_major.to_string(),
    )
}

/// Newest `<version>-<yyyymmddhhmm>-<major>-<distribution>` tag of the extension image,
/// pinned by digest.
pub async fn extension_image_with_timestamp(
    registry: &dyn ImageRegistry,
    settings: &Settings,
    metadata: &ExtensionMetadata,
    distribution: &str,
    pg_major: &str,
) -> Result<String> {
    let repository = format!("{}/{}", settings.image_prefix(), metadata.image_name);
    let tags = registry
        .list_tags(&repository)
        .await
        .map_err(|e| e.wrap(format!("while listing tags for image {}", repository)))?;

    let version = extract_extension_version(&metadata.versions, distribution, pg_major)
        .map_err(|e| e.wrap(format!("while extracting extension version for {}", metadata.name)))?;

    let latest = latest_timestamped_tag(&tags, &version, pg_major, distribution)?.ok_or_else(
        || {
            MaintenanceError::NotFound(format!(
                "no image found for image {} (version={} pgMajor={} os={})",
                repository, version, pg_major, distribution
            ))
        },
    )?;

    let image = format!("{}:{}", repository, latest);
    let digest = registry
        .digest(&image)
        .await
        .map_err(|e| e.wrap(format!("while fetching digest for image {}", image)))?;

    Ok(format!("{}@{}", image, digest))
}

/// Greatest tag matching the timestamped pattern. Timestamps are fixed width,
/// so the lexical order is the chronological one.
pub fn latest_timestamped_tag(
    tags: &[String],
    version: &str,
    pg_major: &str,
    distribution: &str,
) -> Result<Option<String>> {
    let re = Regex::new(&format!(
        r"^{}-(\d{{12}})-{}-{}$",
        regex::escape(version),
        regex::escape(pg_major),
        regex::escape(distribution)
    ))?;

    let latest = tags
        .iter()
        .filter_map(|tag| re.captures(tag).map(|caps| (tag, caps)))
        .max_by(|(a, _), (b, _)| a.cmp(b));

    Ok(latest.map(|(tag, caps)| {
        if let Ok(built) = NaiveDateTime::parse_from_str(&caps[1], TAG_TIMESTAMP_FORMAT) {
            debug!("Selected {} built at {}", tag, built);
        }
        tag.clone()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extension::metadata::parse_metadata_str;
    use std::collections::BTreeMap;

    fn versions() -> VersionMap {
        BTreeMap::from([(
            "trixie".to_string(),
            BTreeMap::from([
                ("18".to_string(), "0.8.1-1.pgdg13+1".to_string()),
                ("17".to_string(), "latest".to_string()),
            ]),
        )])
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_extension_version(&versions(), "trixie", "18").unwrap(),
            "0.8.1"
        );
    }

    #[test]
    fn test_extract_version_errors() {
        let err = extract_extension_version(&versions(), "bookworm", "18").unwrap_err();
        assert!(err
            .to_string()
            .contains("no package version found for distribution \"bookworm\" and version 18"));

        let err = extract_extension_version(&versions(), "trixie", "17").unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot extract extension version from \"latest\""));
    }

    #[test]
    fn test_default_image() {
        let metadata = parse_metadata_str(
            r#"metadata = {
  name = "pgvector"
  sql_name = "vector"
  image_name = "pgvector"
  versions = {
    trixie = { "18" = "0.8.1-1.pgdg13+1" }
  }
}"#,
        )
        .unwrap();

        assert_eq!(
            default_extension_image(&Settings::default(), &metadata).unwrap(),
            "ghcr.io/cloudnative-pg/pgvector:0.8.1-18-trixie"
        );
    }

    #[test]
    fn test_latest_timestamped_tag() {
        let tags: Vec<String> = [
            "0.8.1-18-trixie",
            "0.8.1-202501011200-18-trixie",
            "0.8.1-202503021530-18-trixie",
            "0.8.1-202504010000-17-trixie",
            "0.8.1-202505010000-18-bookworm",
            "0.8.10-202506010000-18-trixie",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            latest_timestamped_tag(&tags, "0.8.1", "18", "trixie")
                .unwrap()
                .as_deref(),
            Some("0.8.1-202503021530-18-trixie")
        );
        assert!(latest_timestamped_tag(&tags, "0.9.0", "18", "trixie")
            .unwrap()
            .is_none());
    }
}
