//! Subcommand definitions

pub mod account;
pub mod guardian;
pub mod recovery;

pub use account::AccountCommands;
pub use guardian::GuardianCommands;
pub use recovery::RecoveryCommands;
