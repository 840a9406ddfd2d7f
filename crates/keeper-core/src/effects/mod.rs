//! Effect traits for the collaborators the recovery core consumes.
//!
//! # Effect Classification
//!
//! - **Infrastructure effects**: [`PhysicalTimeEffects`], [`RandomEffects`].
//!   Production handlers live in [`crate::handlers`]; deterministic mocks live
//!   in keeper-testkit.
//! - **Boundary effects**: [`TransactionExecutor`], [`AddressValidator`],
//!   [`IdentitySource`]. Implementations belong to whoever wires the system
//!   (a wallet integration, the CLI, a test harness).

pub mod address;
pub mod identity;
pub mod random;
pub mod time;
pub mod transaction;

pub use address::{AddressFormat, AddressValidator};
pub use identity::{IdentitySource, StaticIdentity};
pub use random::RandomEffects;
pub use time::{PhysicalTimeEffects, TimeError};
pub use transaction::{ExecutionError, Operation, TransactionExecutor};
