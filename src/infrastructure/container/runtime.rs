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
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

/// Bind mount of a host path into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub source: PathBuf,
    pub target: String,
    pub read_only: bool,
}

impl Mount {
    pub fn read_only(source: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: true,
        }
    }

    fn to_arg(&self) -> String {
        let mut arg = format!("{}:{}", self.source.display(), self.target);
        if self.read_only {
            arg.push_str(":ro");
        }
        arg
    }
}

/// A single `run --rm` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub user: Option<String>,
    pub entrypoint: Option<String>,
    pub workdir: Option<String>,
    pub env: BTreeMap<String, String>,
    pub mounts: Vec<Mount>,
    /// Shell script run with `sh -c`; mutually exclusive with `args`
    pub script: Option<String>,
    pub args: Vec<String>,
    /// Stream output to the terminal instead of capturing it
    pub inherit_output: bool,
}

impl RunSpec {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn workdir(mut self, workdir: impl Into<String>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn mount(mut self, mount: Mount) -> Self {
        self.mounts.push(mount);
        self
    }

    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn inherit_output(mut self) -> Self {
        self.inherit_output = true;
        self
    }
}

#[async_trait::async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Run the container to completion and return its stdout.
    ///
    /// A non-zero exit status is an error carrying stderr.
    async fn run(&self, spec: &RunSpec) -> Result<String>;
}

/// Runtime driving a docker compatible CLI (`docker`, `podman`, `nerdctl`).
pub struct CliContainerRuntime {
    binary: String,
    network: Option<String>,
}

impl CliContainerRuntime {
    pub fn new(binary: impl Into<String>, network: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            network,
        }
    }

    /// Arguments passed to the runtime binary.
    pub fn command_args(&self, spec: &RunSpec) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];

        if let Some(network) = &self.network {
            args.push("--network".to_string());
            args.push(network.clone());
        }
        if let Some(user) = &spec.user {
            args.push("--user".to_string());
            args.push(user.clone());
        }
        if let Some(workdir) = &spec.workdir {
            args.push("--workdir".to_string());
            args.push(workdir.clone());
        }
        for (key, value) in &spec.env {
            args.push("--env".to_string());
            args.push(format!("{}={}", key, value));
        }
        for mount in &spec.mounts {
            args.push("--volume".to_string());
            args.push(mount.to_arg());
        }

        match (&spec.script, &spec.entrypoint) {
            (Some(script), _) => {
                args.push("--entrypoint".to_string());
                args.push("sh".to_string());
                args.push(spec.image.clone());
                args.push("-c".to_string());
                args.push(script.clone());
            }
            (None, Some(entrypoint)) => {
                args.push("--entrypoint".to_string());
                args.push(entrypoint.clone());
                args.push(spec.image.clone());
                args.extend(spec.args.iter().cloned());
            }
            (None, None) => {
                args.push(spec.image.clone());
                args.extend(spec.args.iter().cloned());
            }
        }

        args
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for CliContainerRuntime {
    async fn run(&self, spec: &RunSpec) -> Result<String> {
        let args = self.command_args(spec);
        debug!("Running {} {}", self.binary, args.join(" "));

        let mut command = Command::new(&self.binary);
        command.args(&args).stdin(Stdio::null());

        if spec.inherit_output {
            let status = command
                .status()
                .await
                .map_err(|e| spawn_error(&self.binary, e))?;
            if !status.success() {
                return Err(MaintenanceError::ContainerError(format!(
                    "{} exited with {}",
                    spec.image, status
                )));
            }
            return Ok(String::new());
        }

        let output = command
            .output()
            .await
            .map_err(|e| spawn_error(&self.binary, e))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("{} stdout: {}", spec.image, stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MaintenanceError::ContainerError(format!(
                "{} exited with {}: {}",
                spec.image,
                output.status,
                stderr.trim()
            )));
        }

        Ok(stdout)
    }
}

fn spawn_error(binary: &str, err: std::io::Error) -> MaintenanceError {
    MaintenanceError::ContainerError(format!(
        "failed to execute '{}': {}. Is the container runtime installed?",
        binary, err
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_command_args() {
        let runtime = CliContainerRuntime::new("docker", Some("kind".to_string()));
        let spec = RunSpec::new("ghcr.io/cloudnative-pg/postgresql:18-minimal-trixie")
            .user("root")
            .env("DEBIAN_FRONTEND", "noninteractive")
            .script("apt-get update");

        assert_eq!(
            runtime.command_args(&spec),
            vec![
                "run",
                "--rm",
                "--network",
                "kind",
                "--user",
                "root",
                "--env",
                "DEBIAN_FRONTEND=noninteractive",
                "--entrypoint",
                "sh",
                "ghcr.io/cloudnative-pg/postgresql:18-minimal-trixie",
                "-c",
                "apt-get update",
            ]
        );
    }

    #[test]
    fn test_mounts_and_args() {
        let runtime = CliContainerRuntime::new("podman", None);
        let spec = RunSpec::new("chainsaw:v0.2")
            .workdir("/e2e")
            .mount(Mount::read_only("/tmp/kube", "/etc/kubeconfig"))
            .args(["test", "./test"]);

        let args = runtime.command_args(&spec);
        assert_eq!(&args[..2], &["run", "--rm"]);
        assert!(args.contains(&"/tmp/kube:/etc/kubeconfig:ro".to_string()));
        assert_eq!(&args[args.len() - 3..], &["chainsaw:v0.2", "test", "./test"]);
    }

    #[tokio::test]
    async fn test_missing_binary_reports_runtime() {
        let runtime = CliContainerRuntime::new("pgext-maint-no-such-runtime", None);
        let err = runtime.run(&RunSpec::new("busybox")).await.unwrap_err();
        assert!(err.to_string().contains("pgext-maint-no-such-runtime"));
    }
}
