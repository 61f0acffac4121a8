//! Maintenance commands

use super::display::{StatusIcon, TableRenderer, TargetInfo};
use crate::domain::config::Settings;
use crate::domain::extension::{parse_build_matrix, parse_extension_metadata};
use crate::domain::scaffold::ScaffoldRequest;
use crate::infrastructure::constants::{README_FILE, TARGET_ALL};
use crate::ExtensionMaintainer;
use clap::{Args, Parser, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON array of extension directories
    #[default]
    Json,
    /// Human readable table
    Table,
}

/// Registry credentials used for annotation and digest lookups
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryCredentials {
    /// Registry username (overrides registry.username)
    #[arg(long, env = "REGISTRY_USERNAME")]
    pub registry_username: Option<String>,

    /// Registry password or token
    #[arg(long, env = "REGISTRY_PASSWORD", hide_env_values = true)]
    pub registry_password: Option<String>,
}

impl RegistryCredentials {
    fn maintainer(&self, mut settings: Settings) -> anyhow::Result<ExtensionMaintainer> {
        if let Some(username) = &self.registry_username {
            settings.registry.username = Some(username.clone());
        }
        Ok(ExtensionMaintainer::new(
            settings,
            self.registry_password.clone(),
        )?)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    /// Name of the extension (lowercase letters, digits, '-' and '_')
    #[arg(long)]
    pub name: String,

    /// Postgres major versions the extension is supported for
    #[arg(long, value_delimiter = ',', default_value = "18")]
    pub versions: Vec<String>,

    /// Debian distributions the extension is supported for
    #[arg(long, value_delimiter = ',', default_value = "trixie,bookworm")]
    pub distros: Vec<String>,

    /// Debian package name, '%version%' stands for the postgres major
    /// (default "postgresql-%version%-<name>")
    #[arg(long)]
    pub package_name: Option<String>,

    /// Directory containing metadata.hcl.tmpl, Dockerfile.tmpl and README.md.tmpl
    #[arg(long, default_value = "templates")]
    pub templates_dir: PathBuf,

    /// Directory the extension directory is created in
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl CreateCommand {
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<()> {
        let maintainer = ExtensionMaintainer::new(settings, None)?;
        let request = ScaffoldRequest {
            name: self.name.clone(),
            versions: self.versions.clone(),
            distros: self.distros.clone(),
            package_name: self.package_name.clone(),
        };

        let written = maintainer.create(&self.templates_dir, &request, &self.output_dir, self.force)?;

        println!("{}", TableRenderer::new().render_written_files("Created", &written));
        println!("Extension {} scaffolded successfully!", self.name);
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct UpdateOsLibsCommand {
    /// Source directory containing the extension folders
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Extension directory to update, or "all"
    #[arg(long, default_value = TARGET_ALL)]
    pub target: String,

    /// Write the system-libs files under this directory instead of the source tree
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl UpdateOsLibsCommand {
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<()> {
        let maintainer = ExtensionMaintainer::new(settings, None)?;
        let written = maintainer
            .update_os_libs(&self.source, &self.target, self.output_dir.as_deref())
            .await?;

        println!("{}", TableRenderer::new().render_written_files("Wrote", &written));
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ListTargetsCommand {
    /// Source directory containing the extension folders
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

/// Which listing a [`ListTargetsCommand`] produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetListing {
    All,
    OsLibs,
    Readme,
}

impl TargetListing {
    fn title(&self) -> &'static str {
        match self {
            TargetListing::All => "Extensions",
            TargetListing::OsLibs => "OS Libs Targets",
            TargetListing::Readme => "README Targets",
        }
    }
}

impl ListTargetsCommand {
    pub async fn execute(&self, settings: Settings, listing: TargetListing) -> anyhow::Result<()> {
        let maintainer = ExtensionMaintainer::new(settings, None)?;
        let targets = match listing {
            TargetListing::All => maintainer.targets(&self.source)?,
            TargetListing::OsLibs => maintainer.os_libs_targets(&self.source)?,
            TargetListing::Readme => maintainer.readme_targets(&self.source)?,
        };

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string(&targets)?),
            OutputFormat::Table => {
                let infos = target_infos(&self.source, &targets)?;
                println!("{}", TableRenderer::new().render_targets(listing.title(), &infos));
            }
        }
        Ok(())
    }
}

fn target_infos(source: &Path, targets: &[String]) -> anyhow::Result<Vec<TargetInfo>> {
    targets
        .iter()
        .map(|dir| {
            let path = source.join(dir);
            let metadata = parse_extension_metadata(&path)?;
            // A broken bake file should not hide the rest of the listing
            let matrix = parse_build_matrix(source, dir).unwrap_or_default();
            Ok(TargetInfo {
                directory: dir.clone(),
                name: metadata.name,
                image_name: metadata.image_name,
                distributions: matrix.distributions,
                major_versions: matrix.major_versions,
                auto_update_os_libs: metadata.auto_update_os_libs,
                has_readme: path.join(README_FILE).is_file(),
            })
        })
        .collect()
}

#[derive(Parser, Debug, Clone)]
pub struct TestingValuesCommand {
    /// Source directory containing the extension folders
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Path to the target extension directory
    #[arg(long)]
    pub target: PathBuf,

    /// Extension image to test [REPOSITORY[:TAG]]; defaults to the image of the
    /// default postgres major on the default distribution
    #[arg(long)]
    pub extension_image: Option<String>,

    #[command(flatten)]
    pub credentials: RegistryCredentials,
}

impl TestingValuesCommand {
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<()> {
        let maintainer = self.credentials.maintainer(settings)?;
        let path = maintainer
            .generate_testing_values(&self.source, &self.target, self.extension_image.as_deref())
            .await?;

        println!(
            "{}",
            TableRenderer::new().render_written_files("Wrote", &[path])
        );
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct TestCommand {
    /// Source directory containing the extension folders and the shared test directory
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Kubeconfig of the cluster to test against
    #[arg(long)]
    pub kubeconfig: PathBuf,

    /// Extension directory to test, or "all"
    #[arg(long, default_value = TARGET_ALL)]
    pub target: String,

    /// Chainsaw image (overrides testing.chainsaw-image)
    #[arg(long)]
    pub chainsaw_image: Option<String>,
}

impl TestCommand {
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<()> {
        let maintainer = ExtensionMaintainer::new(settings, None)?;
        let tested = maintainer
            .test(
                &self.source,
                &self.kubeconfig,
                &self.target,
                self.chainsaw_image.as_deref(),
            )
            .await?;

        for dir in &tested {
            println!("{} {} passed", StatusIcon::SUCCESS.green(), dir);
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateCatalogsCommand {
    /// Source directory containing the extension folders
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Directory containing the base ClusterImageCatalogs
    #[arg(long, default_value = "image-catalogs")]
    pub catalogs_dir: PathBuf,

    /// Directory the extension catalogs are written to
    #[arg(long, default_value = "image-catalogs-extensions")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub credentials: RegistryCredentials,
}

impl GenerateCatalogsCommand {
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<()> {
        if self.output_dir == self.catalogs_dir {
            anyhow::bail!("--output-dir must differ from --catalogs-dir");
        }

        let maintainer = self.credentials.maintainer(settings)?;
        let written = maintainer
            .generate_catalogs(&self.source, &self.catalogs_dir, &self.output_dir)
            .await?;

        println!("{}", TableRenderer::new().render_written_files("Wrote", &written));
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct UpdateReadmeCommand {
    /// Source directory containing the extension folders
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Extension directory to update, or "all"
    #[arg(long, default_value = TARGET_ALL)]
    pub target: String,
}

impl UpdateReadmeCommand {
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<()> {
        let maintainer = ExtensionMaintainer::new(settings, None)?;
        let changed = maintainer.update_readme(&self.source, &self.target)?;

        println!("{}", TableRenderer::new().render_written_files("Updated", &changed));
        Ok(())
    }
}
