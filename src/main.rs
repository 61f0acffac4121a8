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

use clap::Parser;
use pgext_maint::cli::maintenance::TargetListing;
use pgext_maint::cli::{CliArgs, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr, stdout carries command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = args.settings()?;

    match args.command {
        Commands::Create(cmd) => cmd.execute(settings).await,
        Commands::UpdateOsLibs(cmd) => cmd.execute(settings).await,
        Commands::OsLibsTargets(cmd) => cmd.execute(settings, TargetListing::OsLibs).await,
        Commands::Targets(cmd) => cmd.execute(settings, TargetListing::All).await,
        Commands::ReadmeTargets(cmd) => cmd.execute(settings, TargetListing::Readme).await,
        Commands::TestingValues(cmd) => cmd.execute(settings).await,
        Commands::Test(cmd) => cmd.execute(settings).await,
        Commands::GenerateCatalogs(cmd) => cmd.execute(settings).await,
        Commands::UpdateReadme(cmd) => cmd.execute(settings).await,
    }
}
