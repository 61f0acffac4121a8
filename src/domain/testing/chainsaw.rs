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

use crate::domain::config::Settings;
use crate::domain::extension::{extension_directories, Target};
use crate::infrastructure::constants::{
    CHAINSAW_KUBECONFIG, CHAINSAW_WORKDIR, TEST_DIR, VALUES_FILE,
};
use crate::infrastructure::container::{ContainerRuntime, Mount, RunSpec};
use crate::infrastructure::kubernetes::validate_kubeconfig;
use crate::shared::error::{MaintenanceError, Result};
use std::path::Path;
use tracing::info;

/// Chainsaw invocations for one extension directory.
pub fn chainsaw_runs(
    source: &Path,
    dir: &str,
    kubeconfig: &Path,
    chainsaw_image: &str,
    cachebuster: &str,
) -> Result<Vec<RunSpec>> {
    let extension_dir = std::fs::canonicalize(source.join(dir))?;
    let shared_tests = std::fs::canonicalize(source.join(TEST_DIR))?;
    let kubeconfig = std::fs::canonicalize(kubeconfig)?;

    if !extension_dir.join(VALUES_FILE).is_file() {
        return Err(MaintenanceError::NotFound(format!(
            "cannot execute tests for extension \"{}\", values.yaml file is missing",
            dir
        )));
    }

    let name = extension_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string());
    let values = format!("{}/{}", name, VALUES_FILE);

    let base = RunSpec::new(chainsaw_image)
        .workdir(CHAINSAW_WORKDIR)
        .env("CACHEBUSTER", cachebuster)
        .env("KUBECONFIG", CHAINSAW_KUBECONFIG)
        .mount(Mount::read_only(
            &shared_tests,
            format!("{}/{}", CHAINSAW_WORKDIR, TEST_DIR),
        ))
        .mount(Mount::read_only(
            &extension_dir,
            format!("{}/{}", CHAINSAW_WORKDIR, name),
        ))
        .mount(Mount::read_only(&kubeconfig, CHAINSAW_KUBECONFIG))
        .inherit_output();

    let mut runs = vec![base
        .clone()
        .args(["test", "./test", "--values", values.as_str()])];

    if extension_dir.join(TEST_DIR).is_dir() {
        let own_tests = format!("{}/{}", name, TEST_DIR);
        runs.push(base.args(["test", own_tests.as_str(), "--values", values.as_str()]));
    }

    Ok(runs)
}

/// Run the shared and per extension chainsaw suites against the cluster of `kubeconfig`.
pub async fn run_tests(
    runtime: &dyn ContainerRuntime,
    settings: &Settings,
    source: &Path,
    kubeconfig: &Path,
    target: &Target,
    chainsaw_image: Option<&str>,
) -> Result<Vec<String>> {
    let cluster = validate_kubeconfig(kubeconfig).await?;
    info!("Testing against cluster {}", cluster);

    if !source.join(TEST_DIR).is_dir() {
        return Err(MaintenanceError::NotFound(format!(
            "shared test directory {}",
            source.join(TEST_DIR).display()
        )));
    }

    let directories = match target {
        Target::All => extension_directories(source, &settings.discovery.ignore)?,
        Target::Extension(dir) => vec![dir.clone()],
    };

    let image = chainsaw_image.unwrap_or(settings.testing.chainsaw_image.as_str());
    let cachebuster = chrono::Utc::now().to_rfc3339();

    for dir in &directories {
        for spec in chainsaw_runs(source, dir, kubeconfig, image, &cachebuster)? {
            info!("Running chainsaw {} for {}", spec.args.join(" "), dir);
            runtime
                .run(&spec)
                .await
                .map_err(|e| e.wrap(format!("while testing extension {}", dir)))?;
        }
    }

    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_runs_include_extension_suite() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("test")).unwrap();
        fs::create_dir_all(root.path().join("pgvector/test")).unwrap();
        fs::write(root.path().join("pgvector/values.yaml"), "name: pgvector\n").unwrap();
        let kubeconfig = root.path().join("kubeconfig");
        fs::write(&kubeconfig, "apiVersion: v1\n").unwrap();

        let runs = chainsaw_runs(root.path(), "pgvector", &kubeconfig, "chainsaw:v0", "now").unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[0].args,
            vec!["test", "./test", "--values", "pgvector/values.yaml"]
        );
        assert_eq!(
            runs[1].args,
            vec!["test", "pgvector/test", "--values", "pgvector/values.yaml"]
        );
        assert_eq!(runs[0].env["KUBECONFIG"], "/etc/kubeconfig/config");
        assert!(runs[0]
            .mounts
            .iter()
            .any(|m| m.target == "/e2e/pgvector"));
    }

    #[test]
    fn test_missing_values_file() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("test")).unwrap();
        fs::create_dir_all(root.path().join("pgvector")).unwrap();
        let kubeconfig = root.path().join("kubeconfig");
        fs::write(&kubeconfig, "apiVersion: v1\n").unwrap();

        let err = chainsaw_runs(root.path(), "pgvector", &kubeconfig, "chainsaw:v0", "now")
            .unwrap_err();
        assert!(err.to_string().contains("values.yaml file is missing"));
    }
}
