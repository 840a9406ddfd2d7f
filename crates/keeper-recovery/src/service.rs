//! Multi-account recovery service
//!
//! Routes each call to the coordinator of the addressed account. Accounts are
//! independent: operations on different accounts run concurrently, while
//! operations on the same account are serialized by that account's lock and
//! applied in arrival order.

use crate::config::{ActivationPolicy, RecoveryConfig};
use crate::coordinator::{AccountSnapshot, CoordinatorContext, RecoveryCoordinator};
use crate::effects::RecoveryEffects;
use crate::error::{RecoveryError, RecoveryResult};
use crate::events::{BroadcastSink, Notification, NotificationSink};
use crate::registry::Guardian;
use crate::request::RecoveryRequest;
use crate::store::{AccountRecord, MemoryStore, RecoveryStore};
use crate::threshold::QuorumPolicy;
use keeper_core::effects::AddressValidator;
use keeper_core::{AccountId, IdentityRef, KeeperConfig};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, instrument, warn};

struct AccountHandle<E: RecoveryEffects> {
    coordinator: Arc<Mutex<RecoveryCoordinator<E>>>,
    view: watch::Receiver<AccountSnapshot>,
}

impl<E: RecoveryEffects> Clone for AccountHandle<E> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            view: self.view.clone(),
        }
    }
}

/// Builder for [`RecoveryService`]
pub struct RecoveryServiceBuilder<E: RecoveryEffects> {
    effects: Arc<E>,
    config: RecoveryConfig,
    store: Option<Arc<dyn RecoveryStore>>,
    validator: Option<Arc<dyn AddressValidator>>,
    quorum: Option<Arc<dyn QuorumPolicy>>,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl<E: RecoveryEffects + 'static> RecoveryServiceBuilder<E> {
    pub fn config(mut self, config: RecoveryConfig) -> Self {
        self.config = config;
        self
    }

    /// Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn RecoveryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Defaults to the configured [`AddressFormat`](keeper_core::effects::AddressFormat).
    pub fn address_validator(mut self, validator: Arc<dyn AddressValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Defaults to a count threshold from the configuration.
    pub fn quorum_policy(mut self, quorum: Arc<dyn QuorumPolicy>) -> Self {
        self.quorum = Some(quorum);
        self
    }

    /// Additional sink next to the built-in broadcast channel.
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Validate the configuration and build the service.
    pub fn build(self) -> RecoveryResult<RecoveryService<E>> {
        self.config.validate()?;

        let quorum: Arc<dyn QuorumPolicy> = match self.quorum {
            Some(quorum) => quorum,
            None => Arc::new(self.config.quorum_policy()?),
        };
        let validator = self
            .validator
            .unwrap_or_else(|| Arc::new(self.config.address.clone()));
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));

        let events = BroadcastSink::new(self.config.event_buffer);
        let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(events.clone())];
        sinks.extend(self.sinks);

        Ok(RecoveryService {
            effects: self.effects,
            context: Arc::new(CoordinatorContext {
                config: self.config,
                validator,
                quorum,
                store,
                sinks,
            }),
            events,
            accounts: RwLock::new(HashMap::new()),
        })
    }
}

/// Entry point for guardian management and recovery across accounts
pub struct RecoveryService<E: RecoveryEffects> {
    effects: Arc<E>,
    context: Arc<CoordinatorContext>,
    events: BroadcastSink,
    accounts: RwLock<HashMap<AccountId, AccountHandle<E>>>,
}

impl<E: RecoveryEffects> std::fmt::Debug for RecoveryService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryService").finish_non_exhaustive()
    }
}

impl<E: RecoveryEffects + 'static> RecoveryService<E> {
    pub fn builder(effects: Arc<E>) -> RecoveryServiceBuilder<E> {
        RecoveryServiceBuilder {
            effects,
            config: RecoveryConfig::default(),
            store: None,
            validator: None,
            quorum: None,
            sinks: Vec::new(),
        }
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.context.config
    }

    /// Notifications for every account, from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    /// Create and persist an account owned by `owner`.
    #[instrument(skip(self))]
    pub async fn create_account(&self, owner: &str) -> RecoveryResult<AccountId> {
        let owner = IdentityRef::parse_with(owner, self.context.validator.as_ref())
            .ok_or_else(|| RecoveryError::invalid_address(owner))?;

        let account_id = AccountId::from_uuid(self.effects.random_uuid().await);
        let record = AccountRecord::new(account_id, owner);
        self.context.store.save(&record).await?;
        self.install(record);

        info!(account = %account_id, "account created");
        Ok(account_id)
    }

    /// Identifiers of every persisted account.
    pub async fn accounts(&self) -> RecoveryResult<Vec<AccountId>> {
        Ok(self.context.store.list().await?)
    }

    /// Current observable state, staged changes included.
    pub async fn snapshot(&self, account_id: &AccountId) -> RecoveryResult<AccountSnapshot> {
        let handle = self.handle(account_id).await?;
        let snapshot = handle.view.borrow().clone();
        Ok(snapshot)
    }

    /// Watch an account's observable state.
    pub async fn watch(
        &self,
        account_id: &AccountId,
    ) -> RecoveryResult<watch::Receiver<AccountSnapshot>> {
        Ok(self.handle(account_id).await?.view)
    }

    pub async fn add_guardian(
        &self,
        account_id: &AccountId,
        caller: &IdentityRef,
        address: &str,
        display_name: &str,
    ) -> RecoveryResult<Guardian> {
        let handle = self.handle(account_id).await?;
        let (guardian, registration) = {
            let mut coordinator = handle.coordinator.lock().await;
            let guardian = coordinator
                .add_guardian(caller, address, display_name)
                .await?;
            let registration = coordinator.registration_of(&guardian.id);
            (guardian, registration)
        };

        if let (ActivationPolicy::AfterDelay { delay_ms }, Some(registration)) =
            (self.context.config.activation, registration)
        {
            self.schedule_activation(&handle, guardian.id.clone(), registration, delay_ms);
        }
        Ok(guardian)
    }

    pub async fn activate_guardian(
        &self,
        account_id: &AccountId,
        guardian: &IdentityRef,
    ) -> RecoveryResult<Guardian> {
        let handle = self.handle(account_id).await?;
        let mut coordinator = handle.coordinator.lock().await;
        coordinator.activate_guardian(guardian).await
    }

    pub async fn remove_guardian(
        &self,
        account_id: &AccountId,
        caller: &IdentityRef,
        guardian: &IdentityRef,
    ) -> RecoveryResult<()> {
        let handle = self.handle(account_id).await?;
        let mut coordinator = handle.coordinator.lock().await;
        coordinator.remove_guardian(caller, guardian).await
    }

    pub async fn open_recovery(
        &self,
        account_id: &AccountId,
        caller: &IdentityRef,
        new_owner: &str,
    ) -> RecoveryResult<RecoveryRequest> {
        let handle = self.handle(account_id).await?;
        let mut coordinator = handle.coordinator.lock().await;
        coordinator.open_recovery(caller, new_owner).await
    }

    pub async fn approve_recovery(
        &self,
        account_id: &AccountId,
        caller: &IdentityRef,
    ) -> RecoveryResult<RecoveryRequest> {
        let handle = self.handle(account_id).await?;
        let mut coordinator = handle.coordinator.lock().await;
        coordinator.approve_recovery(caller).await
    }

    pub async fn cancel_recovery(
        &self,
        account_id: &AccountId,
        caller: &IdentityRef,
    ) -> RecoveryResult<RecoveryRequest> {
        let handle = self.handle(account_id).await?;
        let mut coordinator = handle.coordinator.lock().await;
        coordinator.cancel_recovery(caller).await
    }

    pub async fn acknowledge_recovery(
        &self,
        account_id: &AccountId,
        caller: &IdentityRef,
    ) -> RecoveryResult<RecoveryRequest> {
        let handle = self.handle(account_id).await?;
        let mut coordinator = handle.coordinator.lock().await;
        coordinator.acknowledge_recovery(caller).await
    }

    /// Cached handle, loading the account from the store on first use.
    async fn handle(&self, account_id: &AccountId) -> RecoveryResult<AccountHandle<E>> {
        let cached = self.accounts.read().get(account_id).cloned();
        if let Some(handle) = cached {
            return Ok(handle);
        }

        let record = self
            .context
            .store
            .load(account_id)
            .await?
            .ok_or(RecoveryError::AccountNotFound {
                account: *account_id,
            })?;
        debug!(account = %account_id, "account loaded from store");
        Ok(self.install(record))
    }

    /// Insert a coordinator unless another task got there first.
    fn install(&self, record: AccountRecord) -> AccountHandle<E> {
        let mut accounts = self.accounts.write();
        accounts
            .entry(record.account_id)
            .or_insert_with(|| {
                let coordinator = RecoveryCoordinator::new(
                    record,
                    Arc::clone(&self.effects),
                    Arc::clone(&self.context),
                );
                let view = coordinator.subscribe();
                AccountHandle {
                    coordinator: Arc::new(Mutex::new(coordinator)),
                    view,
                }
            })
            .clone()
    }

    /// Activate `guardian` after `delay_ms`, unless the entry registered as
    /// `registration` has been removed or replaced by then.
    fn schedule_activation(
        &self,
        handle: &AccountHandle<E>,
        guardian: IdentityRef,
        registration: u64,
        delay_ms: u64,
    ) {
        let coordinator = Arc::clone(&handle.coordinator);
        let effects = Arc::clone(&self.effects);
        tokio::spawn(async move {
            if let Err(e) = effects.sleep_ms(delay_ms).await {
                warn!(%guardian, error = %e, "delayed activation aborted");
                return;
            }
            let mut coordinator = coordinator.lock().await;
            if let Err(e) = coordinator.activate_registered(&guardian, registration).await {
                debug!(%guardian, error = %e, "delayed activation skipped");
            }
        });
    }
}
