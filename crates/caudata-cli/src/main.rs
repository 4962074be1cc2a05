//! Caudata CLI - Command-line interface
//!
//! Runs the occurrence pipeline, or any of its stages, against GBIF and the
//! AWS terrain tiles.

mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod output;
mod output_types;
mod progress;
mod storage;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Create async runtime
    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli)));

    if let Err(error) = result {
        errors::from_anyhow(error).display();
        std::process::exit(1);
    }
}
