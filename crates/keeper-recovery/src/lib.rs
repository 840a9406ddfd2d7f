//! # Keeper Recovery - Layer 2: Guardian Recovery Protocol
//!
//! Guardian management and threshold-gated social recovery for accounts whose
//! owner key may be lost.
//!
//! ## Purpose
//!
//! - Guardian registry with a `Pending -> Active -> Inactive` lifecycle
//! - Recovery request state machine: open, approve until quorum, transfer
//!   ownership, or cancel
//! - Optimistic application: every change is visible while its transaction is
//!   in flight and rolled back if the transaction fails
//! - Committed-change notifications and pluggable persistence
//!
//! ## Architecture Constraints
//!
//! This crate depends on:
//! - **Layer 1** (keeper-core): Identifiers, effect traits, errors, config
//!
//! ## What Does NOT Belong Here
//!
//! - Effect handler implementations (belong in keeper-core handlers or binaries)
//! - Concrete transaction backends or file storage (belong in keeper-cli)
//! - Caller authentication (consumed through `IdentitySource`)
//!
//! ## Design Principles
//!
//! - Authorization happens before any state change
//! - At most one non-terminal recovery request per account
//! - The required approval count is fixed when a request opens
//! - Failed or abandoned operations leave committed state untouched

#![forbid(unsafe_code)]
#![allow(missing_docs)]

/// Recovery configuration
pub mod config;

/// Per-account coordinator with staged commits
pub mod coordinator;

/// Effect composition for recovery operations
pub mod effects;

/// Recovery error type
pub mod error;

/// Committed-change notifications
pub mod events;

/// Role resolution and authorization
pub mod permission;

/// Guardian registry
pub mod registry;

/// Recovery request and status machine
pub mod request;

/// Multi-account service
pub mod service;

/// Account persistence
pub mod store;

/// Approval threshold evaluation
pub mod threshold;

pub use config::{ActivationPolicy, RecoveryConfig, RemovalPolicy};
pub use coordinator::{AccountSnapshot, CoordinatorContext, RecoveryCoordinator};
pub use effects::RecoveryEffects;
pub use error::{RecoveryError, RecoveryResult};
pub use events::{BroadcastSink, MemorySink, Notification, NotificationSink, RecoveryEvent};
pub use permission::{PermissionGuard, RequiredRole, Role};
pub use registry::{Guardian, GuardianRegistry, GuardianStatus};
pub use request::{Approval, ApprovalOutcome, RecoveryRequest, RecoveryStatus};
pub use service::{RecoveryService, RecoveryServiceBuilder};
pub use store::{AccountRecord, MemoryStore, RecoveryStore};
pub use threshold::{CountThreshold, QuorumPolicy};
