//! Guardian management commands.

use clap::Subcommand;
use keeper_core::AccountId;

#[derive(Debug, Clone, Subcommand)]
pub enum GuardianCommands {
    /// Register a guardian; it starts out pending.
    Add {
        #[arg(long)]
        account: AccountId,

        /// Guardian address
        #[arg(long)]
        address: String,

        /// Label shown to operators
        #[arg(long)]
        name: String,
    },

    /// Confirm a pending guardian. Owner only.
    Activate {
        #[arg(long)]
        account: AccountId,

        #[arg(long)]
        address: String,
    },

    /// Remove a guardian.
    Remove {
        #[arg(long)]
        account: AccountId,

        #[arg(long)]
        address: String,
    },

    /// List guardians with their status.
    List {
        #[arg(long)]
        account: AccountId,
    },
}
