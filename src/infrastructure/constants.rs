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

/// Source tree layout
pub const METADATA_FILE: &str = "metadata.hcl";
pub const BAKE_FILE: &str = "docker-bake.hcl";
pub const README_FILE: &str = "README.md";
pub const VALUES_FILE: &str = "values.yaml";
pub const SYSTEM_LIBS_DIR: &str = "system-libs";
pub const TEST_DIR: &str = "test";
pub const TARGET_ALL: &str = "all";

/// Bake variables that make up the build matrix
pub const BAKE_VAR_DISTRIBUTIONS: &str = "distributions";
pub const BAKE_VAR_PG_VERSIONS: &str = "pgVersions";

/// Defaults
pub const DEFAULT_PG_MAJOR: u32 = 18;
pub const DEFAULT_DISTRIBUTION: &str = "trixie";
pub const DEFAULT_SUPPORTED_DISTRIBUTIONS: [&str; 2] = ["bookworm", "trixie"];
pub const DEFAULT_REGISTRY_HOST: &str = "ghcr.io";
pub const DEFAULT_REGISTRY_NAMESPACE: &str = "cloudnative-pg";
pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";
pub const DEFAULT_PARALLELISM: usize = 4;
pub const DEFAULT_REGISTRY_RETRIES: usize = 3;
pub const DEFAULT_CHAINSAW_IMAGE: &str = "ghcr.io/kyverno/chainsaw:v0.2.14@sha256:c703e4d4ce7b89c5121fe957ab89b6e2d33f91fd15f8274a9f79ca1b2ba8ecef";
pub const DEFAULT_IGNORED_DIRS: [&str; 4] = [".git", ".github", "dagger", "target"];

/// Base image repository used for package manager runs
pub const POSTGRES_IMAGE_NAME: &str = "postgresql";
pub const MINIMAL_IMAGE_FLAVOR: &str = "minimal";

/// Package name placeholder for the postgres major version
pub const PACKAGE_VERSION_PLACEHOLDER: &str = "%version%";

/// Catalog labels
pub const LABEL_IMAGE_OS: &str = "images.cnpg.io/os";
pub const LABEL_IMAGE_TYPE: &str = "images.cnpg.io/type";
pub const IMAGE_TYPE_MINIMAL: &str = "minimal";
pub const CATALOG_KIND: &str = "ClusterImageCatalog";
pub const CATALOG_OUTPUT_PREFIX: &str = "catalog-extensions-";

/// Image annotations
pub const ANNOTATION_BASE_IMAGE: &str = "io.cloudnativepg.image.base.name";
pub const ANNOTATION_IMAGE_VERSION: &str = "org.opencontainers.image.version";

/// OCI / Docker media types
pub const MEDIA_TYPE_OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const MEDIA_TYPE_OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const MEDIA_TYPE_DOCKER_LIST: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";
pub const MEDIA_TYPE_DOCKER_MANIFEST: &str =
    "application/vnd.docker.distribution.manifest.v2+json";

/// Scaffolding templates
pub const TEMPLATE_EXTENSION: &str = ".tmpl";
pub const SCAFFOLD_FILES: [&str; 3] = ["metadata.hcl", "Dockerfile", "README.md"];

/// Chainsaw container layout
pub const CHAINSAW_WORKDIR: &str = "/e2e";
pub const CHAINSAW_KUBECONFIG: &str = "/etc/kubeconfig/config";
