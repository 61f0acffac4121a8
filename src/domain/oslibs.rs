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

//! OS shared library dependencies of extension packages.
//!
//! The package manager of the minimal postgres image is asked for the URIs it
//! would download for the extension package; the `lib*` packages and their
//! checksums are kept, one per line, in
//! `<extension>/system-libs/<major>-<distribution>-os-libs.txt`.

use crate::domain::config::Settings;
use crate::domain::extension::{
    parse_build_matrix, select_extensions, ExtensionFilter, ExtensionMetadata, Target,
};
use crate::infrastructure::constants::SYSTEM_LIBS_DIR;
use crate::infrastructure::container::{ContainerRuntime, RunSpec};
use crate::shared::error::{MaintenanceError, Result};
use futures::stream::{self, StreamExt};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const LIBS_PATTERN: &str = r"(?m)^.*\s(lib\S*).*(MD5Sum:.*)$";

/// One package manager run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsLibsJob {
    /// Extension directory relative to the source root
    pub dir: String,
    pub extension: String,
    pub package: String,
    pub distribution: String,
    pub major: String,
}

impl OsLibsJob {
    pub fn file_name(&self) -> String {
        os_libs_file_name(&self.major, &self.distribution)
    }

    /// Output path relative to the source root
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.dir)
            .join(SYSTEM_LIBS_DIR)
            .join(self.file_name())
    }

    fn describe(&self) -> String {
        format!(
            "extension {} (PostgreSQL {} on {})",
            self.extension, self.major, self.distribution
        )
    }
}

pub fn os_libs_file_name(major: &str, distribution: &str) -> String {
    format!("{}-{}-os-libs.txt", major, distribution)
}

/// Keep `<lib> MD5Sum:<sum>` for every library line of the package manager output.
pub fn parse_os_libs(output: &str) -> Result<Option<String>> {
    let re = Regex::new(LIBS_PATTERN)?;

    let mut matched = false;
    let mut result = String::new();
    for caps in re.captures_iter(output) {
        matched = true;
        if let (Some(lib), Some(sum)) = (caps.get(1), caps.get(2)) {
            result.push_str(lib.as_str());
            result.push(' ');
            result.push_str(sum.as_str());
            result.push('\n');
        }
    }

    if !matched {
        return Ok(None);
    }
    Ok(Some(result))
}

/// Jobs for every extension selected by `target`, in matrix order.
pub fn plan_os_libs(settings: &Settings, source: &Path, target: &Target) -> Result<Vec<OsLibsJob>> {
    let extensions = select_extensions(
        source,
        &settings.discovery.ignore,
        target,
        ExtensionFilter::OsLibs,
    )?;

    if let Target::Extension(dir) = target {
        if extensions.values().all(|m| !m.auto_update_os_libs) {
            return Err(MaintenanceError::validation(format!(
                "the target \"{}\" does not require OS Libs update",
                dir
            )));
        }
    }

    let mut jobs = Vec::new();
    for (dir, metadata) in &extensions {
        let matrix = parse_build_matrix(source, dir)
            .map_err(|e| e.wrap(format!("while parsing build matrix for extension {}", dir)))?;
        jobs.extend(jobs_for(dir, metadata, matrix.combinations()));
    }

    Ok(jobs)
}

fn jobs_for(
    dir: &str,
    metadata: &ExtensionMetadata,
    combinations: Vec<(String, String)>,
) -> Vec<OsLibsJob> {
    combinations
        .into_iter()
        .map(|(distribution, major)| OsLibsJob {
            dir: dir.to_string(),
            extension: metadata.name.clone(),
            package: metadata.package_name(&major),
            distribution,
            major,
        })
        .collect()
}

/// Run the package manager for a single job and return the file content.
pub async fn fetch_os_libs(
    runtime: &dyn ContainerRuntime,
    settings: &Settings,
    job: &OsLibsJob,
) -> Result<String> {
    let spec = RunSpec::new(settings.postgres_base_image(&job.major, &job.distribution))
        .user("root")
        .env("DEBIAN_FRONTEND", "noninteractive")
        .script(format!(
            "apt-get update 1>&2 && apt-get install -qq --print-uris --no-install-recommends {}",
            job.package
        ));

    debug!("Fetching OS libs for {}", job.describe());
    let output = runtime
        .run(&spec)
        .await
        .map_err(|e| e.wrap(format!("failed to fetch OS libs for {}", job.describe())))?;

    match parse_os_libs(&output)? {
        None => Err(MaintenanceError::NotFound(format!(
            "no library dependencies found for {}: apt-get may have failed or package has no lib dependencies",
            job.describe()
        ))),
        Some(content) if content.is_empty() => Err(MaintenanceError::validation(format!(
            "parsed empty content for {}: regex matched but extracted no data",
            job.describe()
        ))),
        Some(content) => Ok(content),
    }
}

/// Refresh the OS libs files of `target`, writing under `output_dir` (default: `source`).
///
/// Nothing is written unless every run succeeds.
pub async fn update_os_libs(
    runtime: &dyn ContainerRuntime,
    settings: &Settings,
    source: &Path,
    target: &Target,
    output_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let jobs = plan_os_libs(settings, source, target)?;
    let parallelism = settings.container.parallelism.max(1);

    let results: Vec<(usize, Result<String>)> = stream::iter(jobs.iter().enumerate())
        .map(move |(index, job)| async move {
            (index, fetch_os_libs(runtime, settings, job).await)
        })
        .buffer_unordered(parallelism)
        .collect()
        .await;

    let mut contents: Vec<Option<String>> = vec![None; jobs.len()];
    for (index, result) in results {
        contents[index] = Some(result?);
    }

    let root = output_dir.unwrap_or(source);
    let mut written = Vec::with_capacity(jobs.len());
    for (job, content) in jobs.iter().zip(contents) {
        let Some(content) = content else {
            continue;
        };
        let path = root.join(job.relative_path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Sorted extension directories with `auto_update_os_libs` enabled.
pub fn os_libs_targets(settings: &Settings, source: &Path) -> Result<Vec<String>> {
    Ok(select_extensions(
        source,
        &settings.discovery.ignore,
        &Target::All,
        ExtensionFilter::OsLibs,
    )?
    .into_keys()
    .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const APT_OUTPUT: &str = "\
'http://deb.debian.org/debian/pool/main/g/gcc-14/libgcc-s1_14.2.0-19_amd64.deb' libgcc-s1_14.2.0-19_amd64.deb 72352 MD5Sum:0a1b2c3d4e5f
'http://deb.debian.org/debian/pool/main/p/proj/libproj25_9.6.0-1_amd64.deb' libproj25_9.6.0-1_amd64.deb 1420000 MD5Sum:ffeeddccbbaa
'http://apt.postgresql.org/pub/repos/apt/pool/main/p/postgis/postgresql-18-postgis-3_3.5.3+dfsg-1.pgdg13+1_amd64.deb' postgresql-18-postgis-3_3.5.3.deb 5000 MD5Sum:123456
";

    #[test]
    fn test_parse_os_libs() {
        let parsed = parse_os_libs(APT_OUTPUT).unwrap().unwrap();
        assert_eq!(
            parsed,
            "libgcc-s1_14.2.0-19_amd64.deb MD5Sum:0a1b2c3d4e5f\nlibproj25_9.6.0-1_amd64.deb MD5Sum:ffeeddccbbaa\n"
        );
    }

    #[test]
    fn test_parse_os_libs_without_matches() {
        assert!(parse_os_libs("Reading package lists...\n").unwrap().is_none());
    }

    #[test]
    fn test_job_paths() {
        let job = OsLibsJob {
            dir: "postgis".to_string(),
            extension: "postgis".to_string(),
            package: "postgresql-18-postgis-3".to_string(),
            distribution: "trixie".to_string(),
            major: "18".to_string(),
        };
        assert_eq!(job.file_name(), "18-trixie-os-libs.txt");
        assert_eq!(
            job.relative_path(),
            PathBuf::from("postgis/system-libs/18-trixie-os-libs.txt")
        );
    }
}
