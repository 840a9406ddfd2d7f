//! Effect composition for recovery operations.
//!
//! Coordinators are generic over a single composed trait so tests can drive them
//! with one deterministic mock and production can wire real handlers.
//!
//! # Usage
//!
//! ```ignore
//! use keeper_recovery::effects::RecoveryEffects;
//!
//! async fn stamp<E: RecoveryEffects>(effects: &E) -> u64 {
//!     effects.physical_time().await.map(|t| t.ts_ms).unwrap_or_default()
//! }
//! ```

use keeper_core::effects::{PhysicalTimeEffects, RandomEffects, TransactionExecutor};

/// Composed effects required for recovery operations.
///
/// # Included Effects
///
/// - **TransactionExecutor**: Confirms every staged state change
/// - **PhysicalTimeEffects**: Timestamps and delayed activation
/// - **RandomEffects**: Account and request identifiers
pub trait RecoveryEffects:
    TransactionExecutor + PhysicalTimeEffects + RandomEffects + Send + Sync
{
}

/// Blanket implementation for any type satisfying all component traits.
impl<T> RecoveryEffects for T where
    T: TransactionExecutor + PhysicalTimeEffects + RandomEffects + Send + Sync
{
}
