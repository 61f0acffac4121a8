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
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use std::path::Path;
use tracing::debug;

/// Load and resolve a kubeconfig file, returning the URL of its current cluster.
pub async fn validate_kubeconfig(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(MaintenanceError::NotFound(format!(
            "kubeconfig {}",
            path.display()
        )));
    }

    let kubeconfig = Kubeconfig::read_from(path)?;
    if kubeconfig.clusters.is_empty() {
        return Err(MaintenanceError::config_error(format!(
            "kubeconfig {} does not define any cluster",
            path.display()
        )));
    }

    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
    let cluster_url = config.cluster_url.to_string();
    debug!("Kubeconfig {} points to {}", path.display(), cluster_url);

    Ok(cluster_url)
}
