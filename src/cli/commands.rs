// CLI command definitions

use super::maintenance::{
    CreateCommand, GenerateCatalogsCommand, ListTargetsCommand, TestCommand,
    TestingValuesCommand, UpdateOsLibsCommand, UpdateReadmeCommand,
};
use crate::domain::config::{apply_to_settings, Settings, CONFIG_ENV_VAR};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pgext-maint",
    version,
    about = "Maintenance tool for PostgreSQL extension container images",
    long_about = "Scaffolds extensions, refreshes OS library listings, generates ClusterImageCatalogs \
                  and chainsaw values, and keeps README image references in sync"
)]
pub struct CliArgs {
    /// Settings file (TOML)
    #[arg(long, global = true, env = CONFIG_ENV_VAR, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dynamic configuration properties overriding the settings file (-D key=value)
    ///
    /// Registry: registry.host, registry.namespace, registry.username, registry.insecure, registry.retries
    /// Defaults: defaults.pg-major, defaults.distribution
    /// Discovery: distributions.supported, discovery.ignore (comma-separated)
    /// Containers: container.runtime, container.network, container.parallelism
    /// Testing: testing.chainsaw-image
    ///
    /// Example: -Dregistry.host=localhost:5000 -Dregistry.insecure=true
    #[arg(short = 'D', global = true, value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    /// Settings file, then `-D` overrides
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;

        if !self.properties.is_empty() {
            let dynamic_configs = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_settings(&dynamic_configs, &mut settings)?;
        }

        Ok(settings)
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new extension directory from templates
    Create(CreateCommand),

    /// Refresh the system-libs listings of the selected extension(s)
    UpdateOsLibs(UpdateOsLibsCommand),

    /// List extensions requiring OS libs updates
    OsLibsTargets(ListTargetsCommand),

    /// List all extensions
    Targets(ListTargetsCommand),

    /// List extensions shipping a README
    ReadmeTargets(ListTargetsCommand),

    /// Generate chainsaw values.yaml for an extension
    TestingValues(TestingValuesCommand),

    /// Run chainsaw tests against a cluster
    Test(TestCommand),

    /// Generate extension ClusterImageCatalogs from the minimal base catalogs
    GenerateCatalogs(GenerateCatalogsCommand),

    /// Update image references in extension READMEs
    UpdateReadme(UpdateReadmeCommand),
}

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();

    for config in configs {
        let Some((key, value)) = config.split_once('=') else {
            return Err(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            ));
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Empty key in config: '{}'", config));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}
