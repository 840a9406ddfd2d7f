//! Recovery notifications
//!
//! Every committed state change emits one or more [`RecoveryEvent`]s, tagged with
//! the account they belong to. Sinks receive events only after the matching
//! transaction has been confirmed; staged changes that are rolled back never
//! produce an event.

use crate::registry::Guardian;
use keeper_core::{AccountId, IdentityRef, RequestId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A committed change to an account's guardians or recovery request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecoveryEvent {
    GuardianAdded {
        guardian: Guardian,
    },
    GuardianActivated {
        guardian: IdentityRef,
    },
    GuardianRemoved {
        guardian: IdentityRef,
    },
    RecoveryOpened {
        request: RequestId,
        target_new_owner: IdentityRef,
        initiated_by: IdentityRef,
        required_approvals: u32,
    },
    RecoveryApproved {
        request: RequestId,
        guardian: IdentityRef,
        approvals: usize,
        required: u32,
    },
    RecoveryCompleted {
        request: RequestId,
        new_owner: IdentityRef,
    },
    RecoveryCancelled {
        request: RequestId,
        cancelled_by: IdentityRef,
    },
}

/// Event with its account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub account_id: AccountId,
    pub event: RecoveryEvent,
}

/// Receives committed notifications.
///
/// Called while the account is locked; implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Fans notifications out to any number of subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to notifications emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: Notification) {
        // No subscribers is fine
        let _ = self.sender.send(notification);
    }
}

/// Collects notifications in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    notifications: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Events only, in arrival order.
    pub fn events(&self) -> Vec<RecoveryEvent> {
        self.notifications
            .lock()
            .iter()
            .map(|n| n.event.clone())
            .collect()
    }

    /// Take everything received so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}
