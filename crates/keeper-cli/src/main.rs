//! Operator CLI for Keeper
//!
//! Command-line interface for guardian management and social recovery.

use anyhow::Result;
use clap::Parser;
use keeper_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let output = keeper_cli::run(&cli).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
