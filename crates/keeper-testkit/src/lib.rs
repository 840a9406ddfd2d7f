//! Keeper Testing Infrastructure
//!
//! Deterministic effect mocks and address fixtures shared by the recovery and
//! CLI test suites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! keeper-testkit = { path = "../keeper-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,ignore
//! use keeper_testkit::*;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let effects = MockEffects::deterministic();
//!     effects.fail_next(ExecutionError::Cancelled);
//!     // ... drive a coordinator with `effects`
//! }
//! ```

#![allow(missing_docs)]

pub mod fixtures;
pub mod mock_effects;

pub use fixtures::*;
pub use mock_effects::MockEffects;

// Re-export commonly used types for convenience
pub use keeper_core::effects::{ExecutionError, Operation};
pub use keeper_core::{AccountId, IdentityRef};
