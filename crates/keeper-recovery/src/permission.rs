//! Role resolution and authorization
//!
//! Every mutating operation resolves the caller's role against the current
//! registry before it touches state.

use crate::error::{RecoveryError, RecoveryResult};
use crate::registry::GuardianRegistry;
use keeper_core::IdentityRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a caller holds relative to one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Current owner of the account
    Owner,
    /// Registered guardian, in any status
    Guardian(IdentityRef),
    /// No relation to the account
    Unaffiliated,
}

/// Role an operation demands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequiredRole {
    Owner,
    ActiveGuardian,
}

impl fmt::Display for RequiredRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredRole::Owner => f.write_str("owner"),
            RequiredRole::ActiveGuardian => f.write_str("active guardian"),
        }
    }
}

/// Stateless authorization checks over a [`GuardianRegistry`]
pub struct PermissionGuard;

impl PermissionGuard {
    /// Resolve the role of `caller`. Ownership wins over guardianship.
    pub fn role_of(caller: &IdentityRef, registry: &GuardianRegistry) -> Role {
        if caller == registry.owner() {
            return Role::Owner;
        }
        registry
            .get(caller)
            .map_or(Role::Unaffiliated, |guardian| Role::Guardian(guardian.id.clone()))
    }

    /// Whether `caller` holds `required`.
    pub fn authorize(caller: &IdentityRef, required: RequiredRole, registry: &GuardianRegistry) -> bool {
        match (required, Self::role_of(caller, registry)) {
            (RequiredRole::Owner, Role::Owner) => true,
            (RequiredRole::Owner, _) => false,
            // Ownership does not shadow an active guardian entry for the same address
            (RequiredRole::ActiveGuardian, Role::Owner | Role::Guardian(_)) => {
                registry.is_active_guardian(caller)
            }
            (RequiredRole::ActiveGuardian, Role::Unaffiliated) => false,
        }
    }

    /// [`Self::authorize`] as an error.
    pub fn require(
        caller: &IdentityRef,
        required: RequiredRole,
        registry: &GuardianRegistry,
    ) -> RecoveryResult<()> {
        if Self::authorize(caller, required, registry) {
            Ok(())
        } else {
            Err(RecoveryError::unauthorized(caller, required))
        }
    }
}
