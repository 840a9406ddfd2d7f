//! Guardian registry
//!
//! The set of guardians protecting one account, keyed by address and kept in
//! insertion order. The registry also records who currently owns the account,
//! since ownership is what a completed recovery changes.
//!
//! Status lifecycle of an entry:
//!
//! ```text
//! add ──> Pending ──(confirmation)──> Active
//!            │                          │
//!            └────────(remove)──────────┴──> Inactive ──(confirmed)──> purged
//! ```

use crate::error::{RecoveryError, RecoveryResult};
use crate::permission::{PermissionGuard, RequiredRole};
use indexmap::IndexMap;
use keeper_core::effects::AddressValidator;
use keeper_core::{IdentityRef, RequestId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a guardian entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardianStatus {
    /// Registered, awaiting activation
    Pending,
    /// May approve recoveries
    Active,
    /// Removal in flight
    Inactive,
}

impl fmt::Display for GuardianStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardianStatus::Pending => f.write_str("pending"),
            GuardianStatus::Active => f.write_str("active"),
            GuardianStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// A registered guardian
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    /// Guardian address, unique within the registry
    pub id: IdentityRef,
    /// Human readable label for operator UX
    pub display_name: String,
    pub status: GuardianStatus,
    /// Epoch milliseconds at registration
    pub added_at_ms: u64,
}

/// Guardians of one account plus its current owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianRegistry {
    owner: IdentityRef,
    guardians: IndexMap<IdentityRef, Guardian>,
}

impl GuardianRegistry {
    /// Empty registry owned by `owner`.
    pub fn new(owner: IdentityRef) -> Self {
        Self {
            owner,
            guardians: IndexMap::new(),
        }
    }

    pub fn owner(&self) -> &IdentityRef {
        &self.owner
    }

    /// Lookup guardian by address.
    pub fn get(&self, id: &IdentityRef) -> Option<&Guardian> {
        self.guardians.get(id)
    }

    /// Iterate over guardians in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Guardian> {
        self.guardians.values()
    }

    /// Number of guardians in any status.
    pub fn len(&self) -> usize {
        self.guardians.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.guardians.is_empty()
    }

    /// Guardians currently able to approve.
    pub fn active_count(&self) -> usize {
        self.iter()
            .filter(|guardian| guardian.status == GuardianStatus::Active)
            .count()
    }

    pub fn is_active_guardian(&self, id: &IdentityRef) -> bool {
        self.get(id)
            .is_some_and(|guardian| guardian.status == GuardianStatus::Active)
    }

    /// Register a guardian in `Pending` status.
    ///
    /// Checks run in order: caller is the owner, the address is well formed,
    /// the display name is not blank, the address is not already registered.
    pub fn add(
        &mut self,
        caller: &IdentityRef,
        address: &str,
        display_name: &str,
        validator: &dyn AddressValidator,
        added_at_ms: u64,
    ) -> RecoveryResult<Guardian> {
        PermissionGuard::require(caller, RequiredRole::Owner, self)?;

        let id = IdentityRef::parse_with(address, validator)
            .ok_or_else(|| RecoveryError::invalid_address(address))?;

        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(RecoveryError::InvalidDisplayName);
        }

        if self.guardians.contains_key(&id) {
            return Err(RecoveryError::DuplicateGuardian { guardian: id });
        }

        let guardian = Guardian {
            id: id.clone(),
            display_name: display_name.to_string(),
            status: GuardianStatus::Pending,
            added_at_ms,
        };
        self.guardians.insert(id, guardian.clone());
        Ok(guardian)
    }

    /// Mark a guardian `Inactive` ahead of its removal transaction.
    ///
    /// `lock` carries the open request that blocks removal, if the removal
    /// policy says one should.
    pub fn remove(
        &mut self,
        caller: &IdentityRef,
        id: &IdentityRef,
        lock: Option<RequestId>,
    ) -> RecoveryResult<Guardian> {
        PermissionGuard::require(caller, RequiredRole::Owner, self)?;

        let guardian = self
            .guardians
            .get_mut(id)
            .ok_or_else(|| RecoveryError::GuardianNotFound { guardian: id.clone() })?;

        if guardian.status == GuardianStatus::Inactive {
            return Err(RecoveryError::GuardianInactive { guardian: id.clone() });
        }
        if let Some(request) = lock {
            return Err(RecoveryError::GuardianLockedByActiveRecovery {
                guardian: id.clone(),
                request,
            });
        }

        guardian.status = GuardianStatus::Inactive;
        Ok(guardian.clone())
    }

    /// Move a `Pending` guardian to `Active`.
    ///
    /// Returns `None` when the guardian was already active.
    pub fn activate(&mut self, id: &IdentityRef) -> RecoveryResult<Option<Guardian>> {
        let guardian = self
            .guardians
            .get_mut(id)
            .ok_or_else(|| RecoveryError::GuardianNotFound { guardian: id.clone() })?;

        match guardian.status {
            GuardianStatus::Pending => {
                guardian.status = GuardianStatus::Active;
                Ok(Some(guardian.clone()))
            }
            GuardianStatus::Active => Ok(None),
            GuardianStatus::Inactive => Err(RecoveryError::GuardianInactive { guardian: id.clone() }),
        }
    }

    /// Drop an entry, keeping the order of the rest.
    pub(crate) fn purge(&mut self, id: &IdentityRef) -> Option<Guardian> {
        self.guardians.shift_remove(id)
    }

    pub(crate) fn transfer_ownership(&mut self, new_owner: IdentityRef) {
        self.owner = new_owner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use keeper_core::effects::AddressFormat;

    const OWNER: &str = "0x1111111111111111111111111111111111111111";
    const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn owner() -> IdentityRef {
        IdentityRef::new(OWNER)
    }

    fn registry() -> GuardianRegistry {
        GuardianRegistry::new(owner())
    }

    #[test]
    fn add_registers_pending_guardian() {
        let mut registry = registry();
        let guardian = registry
            .add(&owner(), ALICE, "  Alice  ", &AddressFormat::default(), 42)
            .unwrap();

        assert_eq!(guardian.status, GuardianStatus::Pending);
        assert_eq!(guardian.display_name, "Alice");
        assert_eq!(guardian.added_at_ms, 42);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn add_checks_run_in_order() {
        let mut registry = registry();
        let format = AddressFormat::default();
        let stranger = IdentityRef::new(BOB);

        // Unauthorized wins over a malformed address
        assert_matches!(
            registry.add(&stranger, "0x12", "", &format, 0),
            Err(RecoveryError::Unauthorized { .. })
        );
        assert_matches!(
            registry.add(&owner(), "0x12", "", &format, 0),
            Err(RecoveryError::InvalidAddress { .. })
        );
        assert_matches!(
            registry.add(&owner(), ALICE, "   ", &format, 0),
            Err(RecoveryError::InvalidDisplayName)
        );
        registry.add(&owner(), ALICE, "Alice", &format, 0).unwrap();
        assert_matches!(
            registry.add(&owner(), ALICE, "Alice again", &format, 0),
            Err(RecoveryError::DuplicateGuardian { .. })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn activate_is_idempotent_for_active_guardians() {
        let mut registry = registry();
        let alice = IdentityRef::new(ALICE);
        registry
            .add(&owner(), ALICE, "Alice", &AddressFormat::default(), 0)
            .unwrap();

        assert!(registry.activate(&alice).unwrap().is_some());
        assert!(registry.activate(&alice).unwrap().is_none());
        assert!(registry.is_active_guardian(&alice));
    }

    #[test]
    fn remove_marks_inactive_and_purge_preserves_order() {
        let mut registry = registry();
        let format = AddressFormat::default();
        registry.add(&owner(), ALICE, "Alice", &format, 0).unwrap();
        registry.add(&owner(), BOB, "Bob", &format, 1).unwrap();
        let alice = IdentityRef::new(ALICE);

        let removed = registry.remove(&owner(), &alice, None).unwrap();
        assert_eq!(removed.status, GuardianStatus::Inactive);
        assert_matches!(
            registry.activate(&alice),
            Err(RecoveryError::GuardianInactive { .. })
        );
        assert_matches!(
            registry.remove(&owner(), &alice, None),
            Err(RecoveryError::GuardianInactive { .. })
        );

        registry.purge(&alice);
        let names: Vec<_> = registry.iter().map(|g| g.display_name.as_str()).collect();
        assert_eq!(names, vec!["Bob"]);
    }

    #[test]
    fn remove_respects_lock_and_unknown_guardians() {
        let mut registry = registry();
        registry
            .add(&owner(), ALICE, "Alice", &AddressFormat::default(), 0)
            .unwrap();
        let request = RequestId::from_uuid(uuid_for_tests());

        assert_matches!(
            registry.remove(&owner(), &IdentityRef::new(ALICE), Some(request)),
            Err(RecoveryError::GuardianLockedByActiveRecovery { .. })
        );
        assert_matches!(
            registry.remove(&owner(), &IdentityRef::new(BOB), None),
            Err(RecoveryError::GuardianNotFound { .. })
        );
        assert_eq!(
            registry.get(&IdentityRef::new(ALICE)).unwrap().status,
            GuardianStatus::Pending
        );
    }

    #[test]
    fn registry_serializes_in_insertion_order() {
        let mut registry = registry();
        let format = AddressFormat::default();
        registry.add(&owner(), BOB, "Bob", &format, 0).unwrap();
        registry.add(&owner(), ALICE, "Alice", &format, 1).unwrap();

        let json = serde_json::to_string(&registry).unwrap();
        let restored: GuardianRegistry = serde_json::from_str(&json).unwrap();
        let order: Vec<_> = restored.iter().map(|g| g.id.as_str().to_string()).collect();
        assert_eq!(order, vec![BOB.to_string(), ALICE.to_string()]);
        assert_eq!(restored, registry);
    }

    fn uuid_for_tests() -> uuid::Uuid {
        uuid::Uuid::from_bytes([9u8; 16])
    }
}
