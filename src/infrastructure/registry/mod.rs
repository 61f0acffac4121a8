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

pub mod client;
pub mod reference;

pub use client::RegistryClient;
pub use reference::ImageReference;

use crate::shared::error::Result;
use std::collections::BTreeMap;

/// Read-only access to an OCI registry.
///
/// Images are passed as plain references (`ghcr.io/cloudnative-pg/pgvector:0.8.1-18-trixie`).
#[async_trait::async_trait]
pub trait ImageRegistry: Send + Sync {
    /// All tags of the repository, the tag part of `image` is ignored.
    async fn list_tags(&self, image: &str) -> Result<Vec<String>>;

    /// Annotations of the image index or manifest.
    async fn annotations(&self, image: &str) -> Result<BTreeMap<String, String>>;

    /// Content digest (`sha256:...`) of the manifest `image` points to.
    async fn digest(&self, image: &str) -> Result<String>;
}
