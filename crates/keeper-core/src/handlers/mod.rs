//! Production effect handlers
//!
//! Stateless implementations of the infrastructure effects from
//! [`crate::effects`], delegating to the operating system.
//!
//! **Layer Constraint**: NO mock handlers - those belong in keeper-testkit.

pub mod random;
pub mod time;

pub use random::RealRandomHandler;
pub use time::RealTimeHandler;
