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

//! Build matrix resolution from the shared bake file and the extension's metadata

use crate::infrastructure::constants::{
    BAKE_FILE, BAKE_VAR_DISTRIBUTIONS, BAKE_VAR_PG_VERSIONS, METADATA_FILE,
};
use crate::shared::error::{MaintenanceError, Result};
use hcl::eval::{Context, Evaluate};
use hcl::{Body, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const MATRIX_VARIABLES: [&str; 2] = [BAKE_VAR_DISTRIBUTIONS, BAKE_VAR_PG_VERSIONS];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMatrix {
    pub distributions: Vec<String>,
    pub major_versions: Vec<String>,
}

impl BuildMatrix {
    pub fn contains_distribution(&self, distribution: &str) -> bool {
        self.distributions.iter().any(|d| d == distribution)
    }

    pub fn contains_major(&self, major: &str) -> bool {
        self.major_versions.iter().any(|m| m == major)
    }

    /// Every (distribution, major) pair, distributions outermost.
    pub fn combinations(&self) -> Vec<(String, String)> {
        self.distributions
            .iter()
            .flat_map(|d| {
                self.major_versions
                    .iter()
                    .map(move |m| (d.clone(), m.clone()))
            })
            .collect()
    }
}

/// Resolve the build matrix of `target` (a directory relative to `source`).
///
/// Values come from `docker-bake.hcl`, are overridden by the extension's
/// `metadata.hcl`, and finally by environment variables of the same name.
pub fn parse_build_matrix(source: &Path, target: &str) -> Result<BuildMatrix> {
    let bake_path = source.join(BAKE_FILE);
    let bake_data = std::fs::read_to_string(&bake_path).map_err(|e| {
        MaintenanceError::NotFound(format!("{}: {}", bake_path.display(), e))
    })?;

    let metadata_path = source.join(target).join(METADATA_FILE);
    let metadata = std::fs::read_to_string(&metadata_path).map_err(|e| {
        MaintenanceError::NotFound(format!("{}: {}", metadata_path.display(), e))
    })?;

    let env: HashMap<String, String> = MATRIX_VARIABLES
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
        .collect();

    parse_build_matrix_str(&bake_data, &metadata, &env)
}

/// Same as [`parse_build_matrix`] over in-memory contents.
pub fn parse_build_matrix_str(
    bake_data: &str,
    metadata: &str,
    env: &HashMap<String, String>,
) -> Result<BuildMatrix> {
    let mut variables: HashMap<String, Value> = HashMap::new();

    collect_variables(&hcl::parse(bake_data)?, &mut variables)
        .map_err(|e| e.wrap(format!("while reading {}", BAKE_FILE)))?;
    collect_variables(&hcl::parse(metadata)?, &mut variables)
        .map_err(|e| e.wrap(format!("while reading {}", METADATA_FILE)))?;

    for (name, raw) in env {
        debug!("Build matrix variable {} overridden from environment", name);
        variables.insert(name.clone(), Value::String(raw.clone()));
    }

    let mut matrix = BuildMatrix::default();
    if let Some(value) = variables.get(BAKE_VAR_DISTRIBUTIONS) {
        matrix.distributions = value_to_list(BAKE_VAR_DISTRIBUTIONS, value)?;
    }
    if let Some(value) = variables.get(BAKE_VAR_PG_VERSIONS) {
        matrix.major_versions = value_to_list(BAKE_VAR_PG_VERSIONS, value)?;
    }

    Ok(matrix)
}

fn collect_variables(body: &Body, variables: &mut HashMap<String, Value>) -> Result<()> {
    let ctx = Context::new();

    for block in body.blocks() {
        if block.identifier() != "variable" {
            continue;
        }
        let Some(name) = block.labels().first().map(|l| l.as_str()) else {
            continue;
        };
        if !is_matrix_variable(name) {
            continue;
        }
        if let Some(default) = block.body().attributes().find(|a| a.key() == "default") {
            variables.insert(name.to_string(), default.expr().evaluate(&ctx)?);
        }
    }

    // Top-level attributes act as global variables in bake files
    for attribute in body.attributes() {
        if is_matrix_variable(attribute.key()) {
            variables.insert(
                attribute.key().to_string(),
                attribute.expr().evaluate(&ctx)?,
            );
        }
    }

    Ok(())
}

fn is_matrix_variable(name: &str) -> bool {
    MATRIX_VARIABLES.iter().any(|v| *v == name)
}

fn value_to_list(name: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_to_string(name, item))
            .collect(),
        // Environment overrides: JSON array or comma separated list
        Value::String(raw) => {
            let raw = raw.trim();
            if raw.starts_with('[') {
                let parsed: Vec<serde_json::Value> = serde_json::from_str(raw)?;
                parsed
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => Ok(s.clone()),
                        serde_json::Value::Number(n) => Ok(n.to_string()),
                        other => Err(MaintenanceError::HclError(format!(
                            "variable {} contains a non scalar value: {}",
                            name, other
                        ))),
                    })
                    .collect()
            } else {
                Ok(raw
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect())
            }
        }
        other => Err(MaintenanceError::HclError(format!(
            "variable {} must be a list, got {:?}",
            name, other
        ))),
    }
}

fn scalar_to_string(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(MaintenanceError::HclError(format!(
            "variable {} contains a non scalar value: {:?}",
            name, other
        ))),
    }
}
