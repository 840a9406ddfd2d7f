//! Per-invocation wiring
//!
//! Builds the recovery service over the configured store and executor, and
//! resolves the caller every mutating command acts as.

use crate::config::CliConfig;
use crate::effects::LocalEffects;
use crate::executor::LocalExecutor;
use crate::store::JsonFileStore;
use crate::CliError;
use keeper_core::effects::{IdentitySource, StaticIdentity};
use keeper_core::IdentityRef;
use keeper_recovery::{MemorySink, Notification, RecoveryError, RecoveryService};
use std::sync::Arc;

/// Everything a command handler needs
pub struct CliContext {
    service: RecoveryService<LocalEffects>,
    events: Arc<MemorySink>,
    identity: StaticIdentity,
}

impl CliContext {
    pub async fn new(config: &CliConfig, caller: Option<&str>) -> anyhow::Result<Self> {
        let identity = match caller {
            Some(address) => IdentityRef::parse_with(address, &config.recovery.address)
                .map(StaticIdentity::new)
                .ok_or_else(|| CliError::InvalidCaller(address.to_string()))?,
            None => StaticIdentity::anonymous(),
        };

        let store = JsonFileStore::open(&config.store_dir).await?;
        let events = Arc::new(MemorySink::new());
        let effects = LocalEffects::new(LocalExecutor::new(&config.executor));
        let service = RecoveryService::builder(Arc::new(effects))
            .config(config.recovery.clone())
            .store(Arc::new(store))
            .sink(events.clone())
            .build()?;

        Ok(Self {
            service,
            events,
            identity,
        })
    }

    pub fn service(&self) -> &RecoveryService<LocalEffects> {
        &self.service
    }

    /// The `--as` identity, required by every mutating command.
    pub fn caller(&self) -> Result<IdentityRef, CliError> {
        self.identity
            .current_identity()
            .ok_or(CliError::MissingCaller)
    }

    /// Parse a guardian address argument with the configured address format.
    pub fn guardian_address(&self, address: &str) -> Result<IdentityRef, RecoveryError> {
        IdentityRef::parse_with(address, &self.service.config().address)
            .ok_or_else(|| RecoveryError::invalid_address(address))
    }

    /// Notifications committed since the last call.
    pub fn take_events(&self) -> Vec<Notification> {
        self.events.drain()
    }
}
