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

use crate::domain::catalog::{self, SourceCatalog};
use crate::domain::config::Settings;
use crate::domain::extension::{get_extensions, resolve_target, ExtensionFilter};
use crate::domain::scaffold::{self, ScaffoldRequest};
use crate::domain::{oslibs, readme, testing};
use crate::infrastructure::container::{CliContainerRuntime, ContainerRuntime};
use crate::infrastructure::registry::{ImageRegistry, RegistryClient};
use crate::shared::error::Result;
use std::path::{Path, PathBuf};

/// Entry point for every maintenance operation over an extensions source tree.
pub struct ExtensionMaintainer {
    settings: Settings,
    registry: Box<dyn ImageRegistry>,
    runtime: Box<dyn ContainerRuntime>,
}

impl ExtensionMaintainer {
    pub fn new(settings: Settings, registry_password: Option<String>) -> Result<Self> {
        let registry = RegistryClient::new(&settings.registry, registry_password)?;
        let runtime =
            CliContainerRuntime::new(&settings.container.runtime, settings.container.network.clone());
        Ok(Self::with_backends(
            settings,
            Box::new(registry),
            Box::new(runtime),
        ))
    }

    pub fn with_backends(
        settings: Settings,
        registry: Box<dyn ImageRegistry>,
        runtime: Box<dyn ContainerRuntime>,
    ) -> Self {
        Self {
            settings,
            registry,
            runtime,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn create(
        &self,
        templates_dir: &Path,
        request: &ScaffoldRequest,
        output_dir: &Path,
        force: bool,
    ) -> Result<Vec<PathBuf>> {
        scaffold::create_extension(&self.settings, templates_dir, request, output_dir, force)
    }

    pub async fn update_os_libs(
        &self,
        source: &Path,
        target: &str,
        output_dir: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let target = resolve_target(source, target)?;
        oslibs::update_os_libs(
            self.runtime.as_ref(),
            &self.settings,
            source,
            &target,
            output_dir,
        )
        .await
    }

    pub fn os_libs_targets(&self, source: &Path) -> Result<Vec<String>> {
        oslibs::os_libs_targets(&self.settings, source)
    }

    pub fn targets(&self, source: &Path) -> Result<Vec<String>> {
        Ok(
            get_extensions(source, &self.settings.discovery.ignore, ExtensionFilter::All)?
                .into_keys()
                .collect(),
        )
    }

    pub fn readme_targets(&self, source: &Path) -> Result<Vec<String>> {
        readme::readme_targets(&self.settings, source)
    }

    pub async fn generate_testing_values(
        &self,
        source: &Path,
        target_dir: &Path,
        extension_image: Option<&str>,
    ) -> Result<PathBuf> {
        testing::generate_testing_values(
            self.registry.as_ref(),
            &self.settings,
            source,
            target_dir,
            extension_image,
        )
        .await
    }

    pub async fn test(
        &self,
        source: &Path,
        kubeconfig: &Path,
        target: &str,
        chainsaw_image: Option<&str>,
    ) -> Result<Vec<String>> {
        let target = resolve_target(source, target)?;
        testing::run_tests(
            self.runtime.as_ref(),
            &self.settings,
            source,
            kubeconfig,
            &target,
            chainsaw_image,
        )
        .await
    }

    /// Generate the extension catalogs and write them to `output_dir`.
    pub async fn generate_catalogs(
        &self,
        source: &Path,
        catalogs_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let catalogs: Vec<SourceCatalog> =
            catalog::generate_catalogs(self.registry.as_ref(), &self.settings, source, catalogs_dir)
                .await?;

        catalogs
            .iter()
            .map(|c| catalog::write_catalog(c, output_dir))
            .collect()
    }

    pub fn update_readme(&self, source: &Path, target: &str) -> Result<Vec<PathBuf>> {
        let target = resolve_target(source, target)?;
        readme::update_readmes(&self.settings, source, &target)
    }
}
