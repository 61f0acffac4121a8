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

use crate::shared::error::{MaintenanceError, Result};
use std::fmt;

const DOCKER_HUB: &str = "docker.io";
const DOCKER_HUB_API: &str = "registry-1.docker.io";

/// A parsed `[registry/]repository[:tag][@digest]` image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: String,
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MaintenanceError::RegistryError(
                "empty image reference".to_string(),
            ));
        }

        let (name, digest) = match reference.split_once('@') {
            Some((name, digest)) => (name, Some(digest.to_string())),
            None => (reference, None),
        };

        // A colon after the last slash separates the tag; earlier ones belong to a port
        let (name, tag) = match name.rfind(':') {
            Some(idx) if !name[idx..].contains('/') => {
                (&name[..idx], Some(name[idx + 1..].to_string()))
            }
            _ => (name, None),
        };

        let (registry, repository) = match name.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (first.to_string(), rest.to_string())
            }
            _ => (DOCKER_HUB.to_string(), name.to_string()),
        };

        let repository = if registry == DOCKER_HUB && !repository.contains('/') {
            format!("library/{}", repository)
        } else {
            repository
        };

        if repository.is_empty()
            || tag.as_deref() == Some("")
            || digest.as_deref() == Some("")
            || repository != repository.to_lowercase()
        {
            return Err(MaintenanceError::RegistryError(format!(
                "invalid image reference: {}",
                reference
            )));
        }

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
        })
    }

    /// Tag or digest to ask the registry for, digest first.
    pub fn reference(&self) -> &str {
        self.digest
            .as_deref()
            .or(self.tag.as_deref())
            .unwrap_or("latest")
    }

    /// Host serving the registry API.
    pub fn api_host(&self) -> &str {
        if self.registry == DOCKER_HUB {
            DOCKER_HUB_API
        } else {
            &self.registry
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_reference() {
        let r = ImageReference::parse("ghcr.io/cloudnative-pg/pgvector:0.8.1-18-trixie").unwrap();
        assert_eq!(r.registry, "ghcr.io");
        assert_eq!(r.repository, "cloudnative-pg/pgvector");
        assert_eq!(r.tag.as_deref(), Some("0.8.1-18-trixie"));
        assert_eq!(r.reference(), "0.8.1-18-trixie");
        assert_eq!(r.api_host(), "ghcr.io");
    }

    #[test]
    fn test_parse_registry_with_port_and_digest() {
        let r = ImageReference::parse(
            "localhost:5000/pgvector:0.8.1-202501011200-18-trixie@sha256:abc123",
        )
        .unwrap();
        assert_eq!(r.registry, "localhost:5000");
        assert_eq!(r.repository, "pgvector");
        assert_eq!(r.tag.as_deref(), Some("0.8.1-202501011200-18-trixie"));
        assert_eq!(r.reference(), "sha256:abc123");
    }

    #[test]
    fn test_parse_docker_hub_defaults() {
        let r = ImageReference::parse("busybox").unwrap();
        assert_eq!(r.registry, "docker.io");
        assert_eq!(r.repository, "library/busybox");
        assert_eq!(r.reference(), "latest");
        assert_eq!(r.api_host(), "registry-1.docker.io");
    }

    #[test]
    fn test_port_without_tag() {
        let r = ImageReference::parse("localhost:5000/team/ext").unwrap();
        assert_eq!(r.registry, "localhost:5000");
        assert_eq!(r.repository, "team/ext");
        assert!(r.tag.is_none());
    }

    #[test]
    fn test_invalid_references() {
        assert!(ImageReference::parse("").is_err());
        assert!(ImageReference::parse("ghcr.io/x/y:").is_err());
        assert!(ImageReference::parse("ghcr.io/X/Upper:1").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let raw = "ghcr.io/cloudnative-pg/pgvector:0.8.1-18-trixie@sha256:abc";
        assert_eq!(ImageReference::parse(raw).unwrap().to_string(), raw);
    }
}
