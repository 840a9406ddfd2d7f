//! Per-account recovery coordinator
//!
//! One [`RecoveryCoordinator`] owns the authoritative state of one account. Every
//! operation that needs an external transaction follows the same shape:
//!
//! 1. validate and authorize against the committed record
//! 2. apply the change to a staged copy and publish it with the operation marked
//!    in flight, so observers see the result immediately
//! 3. submit the operation to the [`TransactionExecutor`](keeper_core::effects::TransactionExecutor)
//! 4. on confirmation, finalize and commit the staged copy, emit events, persist
//! 5. on failure, timeout, or if the call is dropped, republish the committed
//!    record untouched
//!
//! A store failure after confirmation does not undo the confirmed change: the
//! operation returns [`RecoveryError::NotPersisted`] and the in-memory record
//! already reflects it. Callers must not retry such an operation.
//!
//! Callers serialize access per account (the service wraps each coordinator in
//! an async mutex), so a staged copy is never observed by another operation.

use crate::config::{ActivationPolicy, RecoveryConfig, RemovalPolicy};
use crate::effects::RecoveryEffects;
use crate::error::{RecoveryError, RecoveryResult};
use crate::events::{Notification, NotificationSink, RecoveryEvent};
use crate::permission::{PermissionGuard, RequiredRole};
use crate::registry::Guardian;
use crate::request::{RecoveryRequest, RecoveryStatus};
use crate::store::{AccountRecord, RecoveryStore};
use crate::threshold::QuorumPolicy;
use keeper_core::effects::{AddressValidator, ExecutionError, Operation};
use keeper_core::{AccountId, IdentityRef, KeeperError, RequestId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Collaborators shared by every coordinator of a service
pub struct CoordinatorContext {
    pub config: RecoveryConfig,
    pub validator: Arc<dyn AddressValidator>,
    pub quorum: Arc<dyn QuorumPolicy>,
    pub store: Arc<dyn RecoveryStore>,
    pub sinks: Vec<Arc<dyn NotificationSink>>,
}

/// What observers of an account see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Committed state, or the staged state while `in_flight` is set
    pub record: AccountRecord,
    /// Operation awaiting confirmation
    pub in_flight: Option<Operation>,
}

impl AccountSnapshot {
    /// `true` when no operation is awaiting confirmation.
    pub fn is_settled(&self) -> bool {
        self.in_flight.is_none()
    }
}

/// Republishes the committed record when dropped while armed.
struct RollbackGuard {
    view: Arc<watch::Sender<AccountSnapshot>>,
    committed: Option<AccountRecord>,
}

impl RollbackGuard {
    fn disarm(mut self) {
        self.committed = None;
    }
}

impl Drop for RollbackGuard {
    fn drop(&mut self) {
        if let Some(record) = self.committed.take() {
            self.view.send_replace(AccountSnapshot {
                record,
                in_flight: None,
            });
        }
    }
}

/// Guardian registry and recovery state machine for one account
pub struct RecoveryCoordinator<E: RecoveryEffects> {
    record: AccountRecord,
    effects: Arc<E>,
    context: Arc<CoordinatorContext>,
    view: Arc<watch::Sender<AccountSnapshot>>,
    /// Registration number of each guardian added through this coordinator
    registrations: HashMap<IdentityRef, u64>,
    next_registration: u64,
}

impl<E: RecoveryEffects> RecoveryCoordinator<E> {
    /// Coordinator over an already persisted record.
    pub fn new(record: AccountRecord, effects: Arc<E>, context: Arc<CoordinatorContext>) -> Self {
        let (view, _) = watch::channel(AccountSnapshot {
            record: record.clone(),
            in_flight: None,
        });
        Self {
            record,
            effects,
            context,
            view: Arc::new(view),
            registrations: HashMap::new(),
            next_registration: 0,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.record.account_id
    }

    /// Committed state.
    pub fn record(&self) -> &AccountRecord {
        &self.record
    }

    /// Watch the observable snapshot, staged changes included.
    pub fn subscribe(&self) -> watch::Receiver<AccountSnapshot> {
        self.view.subscribe()
    }

    /// Registration number of the current entry for `guardian`.
    ///
    /// Each confirmed add gets a fresh number, so a guardian removed and added
    /// again is distinguishable from its earlier entry.
    pub fn registration_of(&self, guardian: &IdentityRef) -> Option<u64> {
        self.registrations.get(guardian).copied()
    }

    /// Register a guardian as `Pending`.
    ///
    /// With [`ActivationPolicy::OnExecution`] the guardian is committed as
    /// `Active` instead.
    #[instrument(skip_all, fields(account = %self.record.account_id, caller = %caller))]
    pub async fn add_guardian(
        &mut self,
        caller: &IdentityRef,
        address: &str,
        display_name: &str,
    ) -> RecoveryResult<Guardian> {
        let now = self.now_ms().await?;
        let mut staged = self.record.clone();
        let guardian = staged.registry.add(
            caller,
            address,
            display_name,
            self.context.validator.as_ref(),
            now,
        )?;

        let guardian_id = guardian.id.clone();
        let activate = self.context.config.activation == ActivationPolicy::OnExecution;
        let operation = Operation::AddGuardian {
            guardian: guardian_id.clone(),
        };

        let id = guardian_id.clone();
        let result = self
            .commit_staged(staged, operation, move |record| {
                let mut events = vec![RecoveryEvent::GuardianAdded { guardian }];
                if activate {
                    if let Ok(Some(active)) = record.registry.activate(&id) {
                        events.push(RecoveryEvent::GuardianActivated {
                            guardian: active.id,
                        });
                    }
                }
                events
            })
            .await;
        if committed(&result) {
            self.registrations
                .insert(guardian_id.clone(), self.next_registration);
            self.next_registration += 1;
        }
        result?;
        self.committed_guardian(&guardian_id)
    }

    /// Confirmation callback moving a `Pending` guardian to `Active`.
    ///
    /// No transaction is involved. Activating an already active guardian
    /// returns it unchanged.
    #[instrument(skip_all, fields(account = %self.record.account_id, guardian = %guardian))]
    pub async fn activate_guardian(&mut self, guardian: &IdentityRef) -> RecoveryResult<Guardian> {
        match self.record.registry.activate(guardian)? {
            Some(activated) => {
                self.publish();
                info!("guardian activated");
                self.emit(vec![RecoveryEvent::GuardianActivated {
                    guardian: guardian.clone(),
                }]);
                self.persist().await?;
                Ok(activated)
            }
            None => {
                debug!("guardian already active");
                self.committed_guardian(guardian)
            }
        }
    }

    /// Activate `guardian` only if its entry is still the one registered as
    /// `registration`.
    ///
    /// Returns `None` when the entry was removed or replaced since.
    pub async fn activate_registered(
        &mut self,
        guardian: &IdentityRef,
        registration: u64,
    ) -> RecoveryResult<Option<Guardian>> {
        if self.registration_of(guardian) != Some(registration) {
            debug!(%guardian, registration, "registration superseded, not activating");
            return Ok(None);
        }
        self.activate_guardian(guardian).await.map(Some)
    }

    /// Remove a guardian. The entry shows as `Inactive` until confirmed.
    #[instrument(skip_all, fields(account = %self.record.account_id, caller = %caller, guardian = %guardian))]
    pub async fn remove_guardian(
        &mut self,
        caller: &IdentityRef,
        guardian: &IdentityRef,
    ) -> RecoveryResult<()> {
        let lock = match self.context.config.removal_during_recovery {
            RemovalPolicy::Block => self.record.active_request().map(RecoveryRequest::id),
            RemovalPolicy::Allow => None,
        };

        let mut staged = self.record.clone();
        staged.registry.remove(caller, guardian, lock)?;

        let id = guardian.clone();
        let operation = Operation::RemoveGuardian {
            guardian: guardian.clone(),
        };
        let result = self
            .commit_staged(staged, operation, move |record| {
                record.registry.purge(&id);
                vec![RecoveryEvent::GuardianRemoved { guardian: id }]
            })
            .await;
        if committed(&result) {
            self.registrations.remove(guardian);
        }
        result
    }

    /// Open a recovery toward `new_owner`.
    ///
    /// Allowed for the owner or any active guardian. The target gains no
    /// standing by being named. A terminal request still in the slot is
    /// replaced.
    #[instrument(skip_all, fields(account = %self.record.account_id, caller = %caller))]
    pub async fn open_recovery(
        &mut self,
        caller: &IdentityRef,
        new_owner: &str,
    ) -> RecoveryResult<RecoveryRequest> {
        let target = IdentityRef::parse_with(new_owner, self.context.validator.as_ref())
            .ok_or_else(|| RecoveryError::invalid_address(new_owner))?;

        let registry = &self.record.registry;
        let permitted = PermissionGuard::authorize(caller, RequiredRole::Owner, registry)
            || PermissionGuard::authorize(caller, RequiredRole::ActiveGuardian, registry);
        if !permitted {
            return Err(RecoveryError::unauthorized(caller, RequiredRole::ActiveGuardian));
        }

        if let Some(open) = self.record.active_request() {
            return Err(RecoveryError::already_in_progress(open.id()));
        }

        let active = registry.active_count();
        if active == 0 {
            return Err(RecoveryError::NoActiveGuardians);
        }
        let required = self.context.quorum.required_approvals();
        if usize::try_from(required.get()).map_or(true, |required| required > active) {
            return Err(RecoveryError::ThresholdUnreachable {
                required: required.get(),
                active,
            });
        }

        let now = self.now_ms().await?;
        let id = RequestId::from_uuid(self.effects.random_uuid().await);
        let request = RecoveryRequest::new(id, target.clone(), caller.clone(), now, required);

        let mut staged = self.record.clone();
        staged.recovery = Some(request.clone());

        let event = RecoveryEvent::RecoveryOpened {
            request: id,
            target_new_owner: target.clone(),
            initiated_by: caller.clone(),
            required_approvals: required.get(),
        };
        self.commit_staged(
            staged,
            Operation::InitiateRecovery { new_owner: target },
            move |_| vec![event],
        )
        .await?;

        info!(request = %id, required = required.get(), "recovery opened");
        Ok(request)
    }

    /// Record the caller's approval.
    ///
    /// The approval that reaches quorum also carries the ownership transfer:
    /// while its transaction is in flight the request shows as `Approved`, and
    /// on confirmation it is `Completed` with the registry owned by the target.
    #[instrument(skip_all, fields(account = %self.record.account_id, caller = %caller))]
    pub async fn approve_recovery(&mut self, caller: &IdentityRef) -> RecoveryResult<RecoveryRequest> {
        let request = self
            .record
            .recovery
            .as_ref()
            .ok_or_else(RecoveryError::no_request)?;
        request.ensure_pending()?;
        PermissionGuard::require(caller, RequiredRole::ActiveGuardian, &self.record.registry)?;

        let now = self.now_ms().await?;
        let mut staged = self.record.clone();
        let staged_request = staged
            .recovery
            .as_mut()
            .ok_or_else(RecoveryError::no_request)?;
        let outcome =
            staged_request.record_approval(caller, now, self.context.quorum.as_ref())?;
        let request_id = staged_request.id();
        let new_owner = staged_request.target_new_owner().clone();
        let guardian = caller.clone();

        self.commit_staged(staged, Operation::ApproveRecovery, move |record| {
            let (approvals, required) = outcome.progress();
            let mut events = vec![RecoveryEvent::RecoveryApproved {
                request: request_id,
                guardian,
                approvals,
                required,
            }];
            if outcome.quorum_reached() {
                let completed = record
                    .recovery
                    .as_mut()
                    .is_some_and(|request| request.complete().is_ok());
                if completed {
                    record.registry.transfer_ownership(new_owner.clone());
                    events.push(RecoveryEvent::RecoveryCompleted {
                        request: request_id,
                        new_owner,
                    });
                }
            }
            events
        })
        .await?;

        let request = self.committed_request()?;
        if request.status() == RecoveryStatus::Completed {
            info!(request = %request_id, new_owner = %request.target_new_owner(), "recovery completed");
        } else {
            let (approvals, required) = request.progress();
            info!(request = %request_id, approvals, required, "approval recorded");
        }
        Ok(request)
    }

    /// Cancel the open request. Owner or initiator only.
    #[instrument(skip_all, fields(account = %self.record.account_id, caller = %caller))]
    pub async fn cancel_recovery(&mut self, caller: &IdentityRef) -> RecoveryResult<RecoveryRequest> {
        let request = self
            .record
            .recovery
            .as_ref()
            .ok_or_else(RecoveryError::no_request)?;
        request.ensure_pending()?;
        if request.initiated_by() != caller {
            PermissionGuard::require(caller, RequiredRole::Owner, &self.record.registry)?;
        }
        let request_id = request.id();

        let mut staged = self.record.clone();
        if let Some(request) = staged.recovery.as_mut() {
            request.cancel()?;
        }

        let cancelled_by = caller.clone();
        self.commit_staged(staged, Operation::CancelRecovery, move |_| {
            vec![RecoveryEvent::RecoveryCancelled {
                request: request_id,
                cancelled_by,
            }]
        })
        .await?;

        info!(request = %request_id, "recovery cancelled");
        self.committed_request()
    }

    /// Clear a terminal request from the slot and return it.
    ///
    /// Allowed for the owner, the initiator, or the recovery target. No
    /// transaction or event is involved.
    #[instrument(skip_all, fields(account = %self.record.account_id, caller = %caller))]
    pub async fn acknowledge_recovery(
        &mut self,
        caller: &IdentityRef,
    ) -> RecoveryResult<RecoveryRequest> {
        let request = self
            .record
            .recovery
            .as_ref()
            .ok_or_else(RecoveryError::no_request)?;
        if !request.is_terminal() {
            return Err(RecoveryError::not_actionable(request.id(), request.status()));
        }
        if request.initiated_by() != caller && request.target_new_owner() != caller {
            PermissionGuard::require(caller, RequiredRole::Owner, &self.record.registry)?;
        }

        let concluded = self
            .record
            .recovery
            .take()
            .ok_or_else(RecoveryError::no_request)?;
        self.publish();
        debug!(request = %concluded.id(), status = %concluded.status(), "recovery acknowledged");
        self.persist().await?;
        Ok(concluded)
    }

    /// Stage `staged`, run `operation`, and commit or roll back.
    ///
    /// `finalize` turns the staged copy into its confirmed form and returns the
    /// events to emit.
    async fn commit_staged<F>(
        &mut self,
        mut staged: AccountRecord,
        operation: Operation,
        finalize: F,
    ) -> RecoveryResult<()>
    where
        F: FnOnce(&mut AccountRecord) -> Vec<RecoveryEvent> + Send,
    {
        let rollback = RollbackGuard {
            view: Arc::clone(&self.view),
            committed: Some(self.record.clone()),
        };
        self.view.send_replace(AccountSnapshot {
            record: staged.clone(),
            in_flight: Some(operation.clone()),
        });
        debug!(%operation, "staged change published");

        if let Err(source) = self.execute(&operation).await {
            warn!(%operation, error = %source, "transaction failed, rolling back");
            drop(rollback);
            return Err(RecoveryError::execution_failed(&operation, source));
        }

        let events = finalize(&mut staged);
        self.record = staged;
        rollback.disarm();
        self.publish();
        info!(%operation, "transaction confirmed");

        self.emit(events);
        self.persist().await
    }

    async fn execute(&self, operation: &Operation) -> Result<(), ExecutionError> {
        match self.context.config.confirmation_timeout_ms {
            Some(timeout_ms) => tokio::time::timeout(
                Duration::from_millis(timeout_ms),
                self.effects.execute(operation),
            )
            .await
            .unwrap_or(Err(ExecutionError::TimedOut { timeout_ms })),
            None => self.effects.execute(operation).await,
        }
    }

    async fn now_ms(&self) -> RecoveryResult<u64> {
        let now = self
            .effects
            .physical_time()
            .await
            .map_err(|e| KeeperError::internal(format!("Time error: {e}")))?;
        Ok(now.ts_ms)
    }

    fn publish(&self) {
        self.view.send_replace(AccountSnapshot {
            record: self.record.clone(),
            in_flight: None,
        });
    }

    fn emit(&self, events: Vec<RecoveryEvent>) {
        for event in events {
            let notification = Notification {
                account_id: self.record.account_id,
                event,
            };
            for sink in &self.context.sinks {
                sink.notify(notification.clone());
            }
        }
    }

    /// Save the committed record. Failure yields [`RecoveryError::NotPersisted`]
    /// and leaves the committed state in place.
    async fn persist(&self) -> RecoveryResult<()> {
        self.context
            .store
            .save(&self.record)
            .await
            .map_err(|source| {
                error!(error = %source, "failed to persist committed account state");
                RecoveryError::NotPersisted { source }
            })
    }

    fn committed_guardian(&self, id: &IdentityRef) -> RecoveryResult<Guardian> {
        self.record
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| RecoveryError::GuardianNotFound { guardian: id.clone() })
    }

    fn committed_request(&self) -> RecoveryResult<RecoveryRequest> {
        self.record
            .recovery
            .clone()
            .ok_or_else(RecoveryError::no_request)
    }
}

/// Whether the transaction behind `result` went through.
fn committed(result: &RecoveryResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => err.is_committed(),
    }
}
