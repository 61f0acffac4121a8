//! Build automation for pgext-maint
//!
//! Usage: cargo xtask <command>
//!
//! Available commands:
//! - build: Build the project
//! - test: Run tests
//! - dist: Create distribution packages
//! - render-templates: Scaffold a throwaway extension from templates/
//! - ci: Run CI checks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BINARY: &str = "pgext-maint";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for pgext-maint")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Create distribution packages
    Dist {
        /// Target triple (e.g., x86_64-unknown-linux-gnu)
        #[arg(long)]
        target: Option<String>,
    },
    /// Render the scaffolding templates into a scratch directory
    RenderTemplates {
        /// Extension name used for the rendering
        #[arg(long, default_value = "pg_sample")]
        name: String,
        /// Output directory (default: target/scaffold)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run CI checks (format, clippy, test, render-templates)
    Ci,
    /// Format code
    Format {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    let root = project_root()?;
    sh.change_dir(&root);

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { integration } => test(&sh, integration),
        Commands::Dist { target } => dist(&sh, &root, target),
        Commands::RenderTemplates { name, output } => {
            let output = output.unwrap_or_else(|| root.join("target/scaffold"));
            render_templates(&sh, &name, &output)
        }
        Commands::Ci => ci(&sh, &root),
        Commands::Format { check } => format(&sh, check),
        Commands::Clippy => clippy(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("🔨 Building {}...", BINARY);

    if release {
        cmd!(sh, "cargo build --release").run()?;
        println!("✅ Release build completed: target/release/{}", BINARY);
    } else {
        cmd!(sh, "cargo build").run()?;
        println!("✅ Debug build completed: target/debug/{}", BINARY);
    }

    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    println!("🧪 Running tests...");

    if integration {
        cmd!(sh, "cargo test --test '*'").run()?;
    } else {
        cmd!(sh, "cargo test --all --all-targets").run()?;
    }

    println!("✅ All tests passed");
    Ok(())
}

fn dist(sh: &Shell, root: &Path, target: Option<String>) -> Result<()> {
    println!("📦 Creating distribution package...");

    if let Some(ref target_triple) = target {
        cmd!(sh, "cargo build --release --target {target_triple}").run()?;
    } else {
        cmd!(sh, "cargo build --release").run()?;
    }

    let dist_dir = root.join("dist");
    sh.create_dir(&dist_dir)?;

    let binary_src = match target {
        Some(ref target_triple) => root.join(format!("target/{}/release/{}", target_triple, BINARY)),
        None => root.join(format!("target/release/{}", BINARY)),
    };
    sh.copy_file(&binary_src, dist_dir.join(BINARY))?;

    // Ship the scaffolding templates next to the binary
    let templates_dst = dist_dir.join("templates");
    sh.create_dir(&templates_dst)?;
    for template in sh.read_dir(root.join("templates"))? {
        sh.copy_file(&template, &templates_dst)?;
    }

    let version = env!("CARGO_PKG_VERSION");
    let archive_name = format!("{}-{}.tar.gz", BINARY, version);

    cmd!(sh, "tar -czf {archive_name} -C dist {BINARY} templates")
        .run()
        .context("Failed to create tarball")?;

    println!("✅ Distribution package created: {}", archive_name);
    Ok(())
}

fn render_templates(sh: &Shell, name: &str, output: &Path) -> Result<()> {
    println!("🧩 Rendering templates for {}...", name);

    if output.join(name).exists() {
        sh.remove_path(output.join(name))?;
    }
    sh.create_dir(output)?;

    cmd!(
        sh,
        "cargo run --quiet -- create --name {name} --templates-dir templates --output-dir {output}"
    )
    .run()
    .context("Failed to render templates")?;

    println!("✅ Templates rendered into {}", output.join(name).display());
    Ok(())
}

fn ci(sh: &Shell, root: &Path) -> Result<()> {
    println!("🔍 Running CI checks...");

    println!("\n📝 Checking formatting...");
    format(sh, true)?;

    println!("\n🔧 Running clippy...");
    clippy(sh)?;

    println!("\n🧪 Running tests...");
    test(sh, false)?;

    println!("\n🧩 Rendering templates...");
    render_templates(sh, "pg_sample", &root.join("target/scaffold"))?;

    println!("\n✅ All CI checks passed!");
    Ok(())
}

fn format(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
        println!("✅ Code formatting is correct");
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
        println!("✅ Code formatted");
    }
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(
        sh,
        "cargo clippy --all-targets --all-features -- -D warnings"
    )
    .run()?;
    println!("✅ Clippy checks passed");
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .map(Path::to_path_buf)
        .context("xtask must live one level below the workspace root")
}
