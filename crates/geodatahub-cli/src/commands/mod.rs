//! Command implementations

mod config;
mod download;
mod list;
mod search;

use crate::cli::{Cli, Commands};
use crate::context::AppContext;
use crate::output::OutputWriter;
use anyhow::Result;
use geodatahub_core::config::CliConfigOverrides;

/// Execute a CLI command
pub async fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        llm_backend: cli.llm.map(Into::into),
        download_dir: match cli.command {
            Commands::Download(ref args) => args.output_dir.clone(),
            _ => None,
        },
        api_port: None,
    };
    let ctx = AppContext::load(cli.config.as_deref(), overrides, output)?;

    match cli.command {
        Commands::Search(args) => search::execute(args, &ctx).await,
        Commands::Download(args) => download::execute(args, &ctx).await,
        Commands::List(args) => list::execute(args, &ctx).await,
        Commands::Config => config::execute(&ctx),
    }
}
