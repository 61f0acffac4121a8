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

//! Shared fixtures: in-memory registry and container runtime, and an
//! extensions source tree on disk.

#![allow(dead_code)]

use pgext_maint::shared::error::{MaintenanceError, Result};
use pgext_maint::{ContainerRuntime, ImageRegistry, RunSpec};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeRegistry {
    /// repository -> tags
    pub tags: HashMap<String, Vec<String>>,
    /// image -> annotations
    pub annotations: HashMap<String, BTreeMap<String, String>>,
    /// image -> digest
    pub digests: HashMap<String, String>,
}

impl FakeRegistry {
    pub fn with_tags(mut self, repository: &str, tags: &[&str]) -> Self {
        self.tags.insert(
            repository.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_digest(mut self, image: &str, digest: &str) -> Self {
        self.digests.insert(image.to_string(), digest.to_string());
        self
    }

    pub fn with_annotations(mut self, image: &str, annotations: &[(&str, &str)]) -> Self {
        self.annotations.insert(
            image.to_string(),
            annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

#[async_trait::async_trait]
impl ImageRegistry for FakeRegistry {
    async fn list_tags(&self, image: &str) -> Result<Vec<String>> {
        let repository = image.split(':').next().unwrap_or(image);
        Ok(self.tags.get(repository).cloned().unwrap_or_default())
    }

    async fn annotations(&self, image: &str) -> Result<BTreeMap<String, String>> {
        self.annotations
            .get(image)
            .cloned()
            .ok_or_else(|| MaintenanceError::NotFound(format!("manifest unknown: {}", image)))
    }

    async fn digest(&self, image: &str) -> Result<String> {
        self.digests
            .get(image)
            .cloned()
            .ok_or_else(|| MaintenanceError::NotFound(format!("manifest unknown: {}", image)))
    }
}

/// Runtime answering every run with the same output and recording the specs.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    pub output: String,
    pub runs: Arc<Mutex<Vec<RunSpec>>>,
}

impl FakeRuntime {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            runs: Arc::default(),
        }
    }

    pub fn runs(&self) -> Vec<RunSpec> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn run(&self, spec: &RunSpec) -> Result<String> {
        self.runs.lock().unwrap().push(spec.clone());
        Ok(self.output.clone())
    }
}

/// Runtime answering per base image, after a per-image delay, so that runs
/// can fail or complete out of order.
#[derive(Clone, Default)]
pub struct ScriptedRuntime {
    /// image -> (delay in ms, output or error message)
    pub replies: HashMap<String, (u64, std::result::Result<String, String>)>,
    pub runs: Arc<Mutex<Vec<RunSpec>>>,
}

impl ScriptedRuntime {
    pub fn reply(mut self, image: &str, delay_ms: u64, output: &str) -> Self {
        self.replies
            .insert(image.to_string(), (delay_ms, Ok(output.to_string())));
        self
    }

    pub fn fail(mut self, image: &str, delay_ms: u64, message: &str) -> Self {
        self.replies
            .insert(image.to_string(), (delay_ms, Err(message.to_string())));
        self
    }

    pub fn runs(&self) -> Vec<RunSpec> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn run(&self, spec: &RunSpec) -> Result<String> {
        self.runs.lock().unwrap().push(spec.clone());
        let (delay_ms, reply) = self
            .replies
            .get(&spec.image)
            .cloned()
            .ok_or_else(|| MaintenanceError::NotFound(format!("unexpected image {}", spec.image)))?;
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
        reply.map_err(MaintenanceError::ContainerError)
    }
}

pub const BAKE_FILE: &str = r#"
variable "distributions" {
  default = ["bookworm", "trixie"]
}

variable "pgVersions" {
  default = ["17", "18"]
}

target "default" {
  dockerfile = "Dockerfile"
}
"#;

pub const PGVECTOR: &str = r#"
metadata = {
  name                     = "pgvector"
  sql_name                 = "vector"
  image_name               = "pgvector"
  shared_preload_libraries = []
  extension_control_path   = []
  dynamic_library_path     = []
  ld_library_path          = []
  auto_update_os_libs      = false
  required_extensions      = []
  create_extension         = true

  versions = {
    bookworm = {
      "17" = "0.8.1-1.pgdg12+1"
      "18" = "0.8.1-1.pgdg12+1"
    }
    trixie = {
      "17" = "0.8.1-1.pgdg13+1"
      "18" = "0.8.1-1.pgdg13+1"
    }
  }
}
"#;

pub const POSTGIS: &str = r#"
metadata = {
  name                     = "postgis"
  sql_name                 = "postgis"
  image_name               = "postgis"
  shared_preload_libraries = []
  extension_control_path   = []
  dynamic_library_path     = []
  ld_library_path          = ["system"]
  auto_update_os_libs      = true
  required_extensions      = ["pgvector"]
  create_extension         = true
  package                  = "postgresql-%version%-postgis-3"

  versions = {
    trixie = {
      "18" = "3.6.0+dfsg-2.pgdg13+1"
    }
  }
}

variable "distributions" {
  default = ["trixie"]
}

variable "pgVersions" {
  default = ["18"]
}
"#;

/// Source tree with `pgvector` (README, no OS libs) and `postgis` (OS libs,
/// depends on pgvector).
pub fn source_tree(root: &Path) {
    fs::write(root.join("docker-bake.hcl"), BAKE_FILE).unwrap();

    fs::create_dir_all(root.join("pgvector")).unwrap();
    fs::write(root.join("pgvector/metadata.hcl"), PGVECTOR).unwrap();
    fs::write(
        root.join("pgvector/README.md"),
        "Use ghcr.io/cloudnative-pg/pgvector:0.7.4-18-trixie in your cluster.\n",
    )
    .unwrap();

    fs::create_dir_all(root.join("postgis")).unwrap();
    fs::write(root.join("postgis/metadata.hcl"), POSTGIS).unwrap();

    // Not an extension
    fs::create_dir_all(root.join("test")).unwrap();
    fs::write(root.join("test/chainsaw-test.yaml"), "apiVersion: chainsaw.kyverno.io/v1alpha1\n").unwrap();
}

/// Drops the postgis matrix override so the bake file matrix applies
/// (bookworm and trixie, 17 and 18).
pub fn postgis_full_matrix(root: &Path) {
    let metadata = POSTGIS.split("variable").next().unwrap_or(POSTGIS);
    fs::write(root.join("postgis/metadata.hcl"), metadata).unwrap();
}

pub fn minimal_catalog(os: &str) -> String {
    format!(
        r#"apiVersion: postgresql.cnpg.io/v1
kind: ClusterImageCatalog
metadata:
  name: postgresql-minimal-{os}
  labels:
    images.cnpg.io/family: postgresql
    images.cnpg.io/type: minimal
    images.cnpg.io/os: {os}
spec:
  images:
  - major: 17
    image: ghcr.io/cloudnative-pg/postgresql:17.6-minimal-{os}@sha256:aaa
  - major: 18
    image: ghcr.io/cloudnative-pg/postgresql:18.0-minimal-{os}@sha256:bbb
"#
    )
}
