//! # Keeper CLI - Layer 3: Operator Tooling
//!
//! Drives the recovery service from the command line against a JSON file store
//! and a local transaction executor.
//!
//! ## Purpose
//!
//! - Account, guardian and recovery subcommands mapped one to one onto
//!   `RecoveryService` operations
//! - `keeper.toml` loading with `KEEPER_` environment overrides
//! - Rendering of snapshots and committed events for operators
//!
//! ## Architecture Constraints
//!
//! This crate depends on:
//! - **Layer 1** (keeper-core): Identifiers, effects, production handlers
//! - **Layer 2** (keeper-recovery): The recovery service

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod context;
pub mod effects;
pub mod executor;
pub mod handlers;
pub mod store;

pub use commands::{AccountCommands, GuardianCommands, RecoveryCommands};
pub use config::{load_config, CliConfig, ExecutorConfig};
pub use context::CliContext;
pub use effects::LocalEffects;
pub use executor::LocalExecutor;
pub use store::JsonFileStore;

/// CLI error types
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("No caller identity: pass --as <address>")]
    MissingCaller,

    #[error("Invalid caller address: {0}")]
    InvalidCaller(String),
}

#[derive(Debug, Parser)]
#[command(name = "keeper")]
#[command(about = "Keeper - guardian social recovery for accounts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "keeper.toml")]
    pub config: PathBuf,

    /// Address the command acts as
    #[arg(long = "as", global = true, value_name = "ADDRESS")]
    pub caller: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create and inspect accounts
    #[command(subcommand)]
    Account(AccountCommands),

    /// Manage the guardians of an account
    #[command(subcommand)]
    Guardian(GuardianCommands),

    /// Open, approve, cancel and acknowledge recoveries
    #[command(subcommand)]
    Recovery(RecoveryCommands),

    /// Print the effective configuration
    Config,
}

/// Execute one parsed command and return what should be printed.
pub async fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = load_config(&cli.config)?;
    if let Commands::Config = cli.command {
        return handlers::config::handle_config(&config);
    }

    let ctx = CliContext::new(&config, cli.caller.as_deref()).await?;
    match &cli.command {
        Commands::Account(command) => handlers::account::handle_account(&ctx, command).await,
        Commands::Guardian(command) => handlers::guardian::handle_guardian(&ctx, command).await,
        Commands::Recovery(command) => handlers::recovery::handle_recovery(&ctx, command).await,
        Commands::Config => handlers::config::handle_config(&config),
    }
}
