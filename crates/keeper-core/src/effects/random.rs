//! Randomness effect used for identifier generation.

use async_trait::async_trait;
use uuid::Uuid;

/// Source of fresh identifiers.
///
/// Request and account identifiers are drawn from this effect rather than from
/// ambient randomness so tests can make them deterministic.
#[async_trait]
pub trait RandomEffects: Send + Sync {
    /// Sixteen random bytes.
    async fn random_bytes_16(&self) -> [u8; 16];

    /// A version 4 UUID built from [`Self::random_bytes_16`].
    async fn random_uuid(&self) -> Uuid {
        let bytes = self.random_bytes_16().await;
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}
