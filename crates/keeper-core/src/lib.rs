//! # Keeper Core - Layer 1: Foundation Types and Effect Interfaces
//!
//! Shared vocabulary for the Keeper guardian recovery workspace.
//!
//! ## Purpose
//!
//! - Identifier types: [`IdentityRef`], [`AccountId`], [`RequestId`]
//! - Physical time representation used for all recorded timestamps
//! - Effect traits describing the external collaborators the recovery core
//!   consumes (transaction execution, address validation, caller identity,
//!   time, randomness)
//! - Production effect handlers for time and randomness
//! - The unified [`KeeperError`] and the [`KeeperConfig`] loading contract
//!
//! ## What Does NOT Belong Here
//!
//! - Guardian registry or recovery state machine logic (belongs in keeper-recovery)
//! - Mock handlers (belong in keeper-testkit)
//! - Concrete storage backends or executors (belong in the binaries that wire them)

#![forbid(unsafe_code)]

/// Configuration loading contract
pub mod config;

/// Effect traits for external collaborators
pub mod effects;

/// Unified error type
pub mod errors;

/// Production effect handlers
pub mod handlers;

/// Identifier value types
pub mod identifiers;

/// Physical time value type
pub mod time;

pub use config::KeeperConfig;
pub use errors::{KeeperError, Result};
pub use identifiers::{AccountId, IdentityRef, RequestId};
pub use time::PhysicalTime;
