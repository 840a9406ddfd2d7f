//! Account-level CLI commands.

use clap::Subcommand;
use keeper_core::AccountId;

#[derive(Debug, Clone, Subcommand)]
pub enum AccountCommands {
    /// Create an account owned by the given address.
    Create {
        /// Owner address
        #[arg(long)]
        owner: String,
    },

    /// Display owner, guardians and the recovery slot of an account.
    Show {
        #[arg(long)]
        account: AccountId,

        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all accounts in the store.
    List,
}
