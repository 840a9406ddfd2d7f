//! Caller identity source.
//!
//! Keeper never authenticates callers itself. Whatever proves control of an
//! address (a wallet connection, a signed session) hands the resulting identity
//! to the core through this trait.

use crate::identifiers::IdentityRef;

/// Supplies the currently authenticated caller, if any.
pub trait IdentitySource: Send + Sync {
    fn current_identity(&self) -> Option<IdentityRef>;
}

/// Identity fixed at construction, for operator tooling and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<IdentityRef>);

impl StaticIdentity {
    /// An authenticated caller.
    pub fn new(identity: IdentityRef) -> Self {
        Self(Some(identity))
    }

    /// No caller connected.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentitySource for StaticIdentity {
    fn current_identity(&self) -> Option<IdentityRef> {
        self.0.clone()
    }
}
