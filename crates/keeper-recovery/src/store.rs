//! Account persistence
//!
//! An [`AccountRecord`] is everything that survives a restart for one account:
//! the registry (owner included) and the recovery request slot. Only committed
//! state is ever saved.

use crate::registry::GuardianRegistry;
use crate::request::RecoveryRequest;
use async_trait::async_trait;
use keeper_core::{AccountId, IdentityRef};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted state of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: AccountId,
    pub registry: GuardianRegistry,
    /// At most one request; a terminal one stays until acknowledged or replaced
    pub recovery: Option<RecoveryRequest>,
}

impl AccountRecord {
    /// Fresh account with no guardians.
    pub fn new(account_id: AccountId, owner: IdentityRef) -> Self {
        Self {
            account_id,
            registry: GuardianRegistry::new(owner),
            recovery: None,
        }
    }

    /// The request in the slot, if it is not terminal.
    pub fn active_request(&self) -> Option<&RecoveryRequest> {
        self.recovery.as_ref().filter(|request| !request.is_terminal())
    }
}

/// Durable storage for account records
#[async_trait]
pub trait RecoveryStore: Send + Sync {
    async fn load(&self, account_id: &AccountId) -> keeper_core::Result<Option<AccountRecord>>;

    /// Insert or replace.
    async fn save(&self, record: &AccountRecord) -> keeper_core::Result<()>;

    async fn list(&self) -> keeper_core::Result<Vec<AccountId>>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<AccountId, AccountRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecoveryStore for MemoryStore {
    async fn load(&self, account_id: &AccountId) -> keeper_core::Result<Option<AccountRecord>> {
        Ok(self.records.read().get(account_id).cloned())
    }

    async fn save(&self, record: &AccountRecord) -> keeper_core::Result<()> {
        self.records
            .write()
            .insert(record.account_id, record.clone());
        Ok(())
    }

    async fn list(&self) -> keeper_core::Result<Vec<AccountId>> {
        let mut ids: Vec<_> = self.records.read().keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
