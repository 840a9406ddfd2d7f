//! Transaction execution boundary.
//!
//! Every state change the recovery core makes is mirrored by an external
//! transaction. The core stages the change, hands the matching [`Operation`] to a
//! [`TransactionExecutor`], and commits only when the executor reports success.

use crate::identifiers::IdentityRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation submitted to the transaction layer.
///
/// `Display` renders the wire descriptor, e.g. `add_guardian(0x12..78)` or
/// `approve_recovery()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Register a guardian address
    AddGuardian { guardian: IdentityRef },
    /// Drop a guardian address
    RemoveGuardian { guardian: IdentityRef },
    /// Open a recovery toward a new owner
    InitiateRecovery { new_owner: IdentityRef },
    /// Record a guardian approval; transfers ownership once quorum is reached
    ApproveRecovery,
    /// Abandon the open recovery
    CancelRecovery,
}

impl Operation {
    /// Every descriptor name, in lifecycle order.
    pub const NAMES: [&'static str; 5] = [
        "add_guardian",
        "remove_guardian",
        "initiate_recovery",
        "approve_recovery",
        "cancel_recovery",
    ];

    /// Descriptor name without arguments.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddGuardian { .. } => "add_guardian",
            Operation::RemoveGuardian { .. } => "remove_guardian",
            Operation::InitiateRecovery { .. } => "initiate_recovery",
            Operation::ApproveRecovery => "approve_recovery",
            Operation::CancelRecovery => "cancel_recovery",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::AddGuardian { guardian } | Operation::RemoveGuardian { guardian } => {
                write!(f, "{}({guardian})", self.name())
            }
            Operation::InitiateRecovery { new_owner } => write!(f, "{}({new_owner})", self.name()),
            Operation::ApproveRecovery | Operation::CancelRecovery => {
                write!(f, "{}()", self.name())
            }
        }
    }
}

/// Failure reported by the transaction layer.
///
/// Every variant means the operation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ExecutionError {
    /// The transaction layer refused the operation
    #[error("transaction rejected: {reason}")]
    Rejected { reason: String },

    /// The user or the integration aborted the confirmation
    #[error("transaction cancelled")]
    Cancelled,

    /// No confirmation arrived within the configured bound
    #[error("transaction not confirmed within {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    /// Connectivity or submission failure
    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl ExecutionError {
    /// Create a rejection error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Submits operations and resolves once they are confirmed or have failed.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    async fn execute(&self, operation: &Operation) -> Result<(), ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_match_transaction_names() {
        let guardian = IdentityRef::new("0xabcdef1234567890abcdef1234567890abcdef12");
        assert_eq!(
            Operation::AddGuardian {
                guardian: guardian.clone()
            }
            .to_string(),
            "add_guardian(0xabcdef1234567890abcdef1234567890abcdef12)"
        );
        assert_eq!(
            Operation::RemoveGuardian { guardian }.to_string(),
            "remove_guardian(0xabcdef1234567890abcdef1234567890abcdef12)"
        );
        assert_eq!(Operation::ApproveRecovery.to_string(), "approve_recovery()");
        assert_eq!(Operation::CancelRecovery.to_string(), "cancel_recovery()");
    }

    #[test]
    fn names_cover_every_variant() {
        let guardian = IdentityRef::new("0x01");
        let all = [
            Operation::AddGuardian {
                guardian: guardian.clone(),
            },
            Operation::RemoveGuardian {
                guardian: guardian.clone(),
            },
            Operation::InitiateRecovery {
                new_owner: guardian,
            },
            Operation::ApproveRecovery,
            Operation::CancelRecovery,
        ];
        let names: Vec<_> = all.iter().map(Operation::name).collect();
        assert_eq!(names, Operation::NAMES);
    }

    #[test]
    fn initiate_descriptor_carries_new_owner() {
        let op = Operation::InitiateRecovery {
            new_owner: IdentityRef::new("0x9999"),
        };
        assert_eq!(op.name(), "initiate_recovery");
        assert_eq!(op.to_string(), "initiate_recovery(0x9999)");
    }
}
