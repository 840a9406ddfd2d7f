//! Recovery error type
//!
//! Every failure a caller can observe from the registry or the recovery state
//! machine. Whenever one of these is returned, authoritative state is exactly
//! what it was before the call.

use crate::permission::RequiredRole;
use crate::request::RecoveryStatus;
use keeper_core::effects::{ExecutionError, Operation};
use keeper_core::{AccountId, IdentityRef, KeeperError, RequestId};

/// Errors returned by recovery operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    /// Caller lacks the role the operation requires
    #[error("{caller} is not authorized: requires {required}")]
    Unauthorized {
        caller: IdentityRef,
        required: RequiredRole,
    },

    /// Address rejected by the address validator
    #[error("invalid address: {candidate:?}")]
    InvalidAddress { candidate: String },

    /// Guardian display name was empty
    #[error("guardian display name must not be empty")]
    InvalidDisplayName,

    /// Guardian already present in the registry
    #[error("guardian {guardian} is already registered")]
    DuplicateGuardian { guardian: IdentityRef },

    /// Guardian absent from the registry
    #[error("guardian {guardian} not found")]
    GuardianNotFound { guardian: IdentityRef },

    /// Removal refused while a recovery is open
    #[error("guardian {guardian} cannot be removed while recovery {request} is pending")]
    GuardianLockedByActiveRecovery {
        guardian: IdentityRef,
        request: RequestId,
    },

    /// Guardian is on its way out and cannot change state
    #[error("guardian {guardian} is inactive")]
    GuardianInactive { guardian: IdentityRef },

    /// No request exists, or it is not in a state that allows the operation
    #[error("recovery request not actionable: {reason}")]
    RequestNotActionable { reason: String },

    /// Guardian tried to approve the same request twice
    #[error("guardian {guardian} already approved request {request}")]
    AlreadyApproved {
        guardian: IdentityRef,
        request: RequestId,
    },

    /// Recovery cannot open with no active guardians
    #[error("recovery requires at least one active guardian")]
    NoActiveGuardians,

    /// Threshold can never be met by the current active set
    #[error("threshold of {required} approvals exceeds {active} active guardians")]
    ThresholdUnreachable { required: u32, active: usize },

    /// Unknown account identifier
    #[error("account {account} not found")]
    AccountNotFound { account: AccountId },

    /// The transaction layer did not confirm the operation
    #[error("transaction {operation} failed: {source}")]
    ExecutionFailed {
        operation: String,
        #[source]
        source: ExecutionError,
    },

    /// The change is committed in memory and confirmed by the transaction
    /// layer, but the store did not accept it. Retrying the operation is wrong;
    /// the next successful write persists the state.
    #[error("change committed but not persisted: {source}")]
    NotPersisted {
        #[source]
        source: KeeperError,
    },

    /// Infrastructure failure (time, storage, serialization)
    #[error(transparent)]
    Core(#[from] KeeperError),
}

impl RecoveryError {
    /// Caller lacks `required`
    pub fn unauthorized(caller: &IdentityRef, required: RequiredRole) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            required,
        }
    }

    /// Address failed validation
    pub fn invalid_address(candidate: impl Into<String>) -> Self {
        Self::InvalidAddress {
            candidate: candidate.into(),
        }
    }

    /// No recovery request exists
    pub fn no_request() -> Self {
        Self::RequestNotActionable {
            reason: "no recovery request".to_string(),
        }
    }

    /// Request exists but its status forbids the operation
    pub fn not_actionable(request: RequestId, status: RecoveryStatus) -> Self {
        Self::RequestNotActionable {
            reason: format!("request {request} is {status}"),
        }
    }

    /// A non-terminal request already occupies the slot
    pub fn already_in_progress(request: RequestId) -> Self {
        Self::RequestNotActionable {
            reason: format!("recovery {request} is already in progress"),
        }
    }

    /// The transaction for `operation` failed
    pub fn execution_failed(operation: &Operation, source: ExecutionError) -> Self {
        Self::ExecutionFailed {
            operation: operation.to_string(),
            source,
        }
    }

    /// Whether the failure came from the transaction layer
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, Self::ExecutionFailed { .. })
    }

    /// Whether the operation took effect despite the error
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::NotPersisted { .. })
    }
}

/// Result alias for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;
