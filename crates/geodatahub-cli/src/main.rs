//! GeoDataHub CLI
//!
//! Parses the command line, runs one command and maps failures to exit code 1.

mod cli;
mod commands;
mod context;
mod errors;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;
use output::OutputWriter;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli, &output)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            errors::report(&err, &output);
            ExitCode::FAILURE
        }
    }
}
