//! Recovery request commands.

use clap::Subcommand;
use keeper_core::AccountId;

#[derive(Debug, Clone, Subcommand)]
pub enum RecoveryCommands {
    /// Open a recovery that transfers ownership to a new address.
    Open {
        #[arg(long)]
        account: AccountId,

        /// Address that becomes owner once quorum is reached
        #[arg(long)]
        new_owner: String,
    },

    /// Approve the open recovery as an active guardian.
    Approve {
        #[arg(long)]
        account: AccountId,
    },

    /// Cancel the open recovery (owner or initiator).
    Cancel {
        #[arg(long)]
        account: AccountId,
    },

    /// Clear a completed or cancelled request.
    Acknowledge {
        #[arg(long)]
        account: AccountId,
    },

    /// Show the request in the recovery slot.
    Status {
        #[arg(long)]
        account: AccountId,
    },
}
