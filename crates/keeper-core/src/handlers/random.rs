//! Random effect handler
//!
//! This is the handler layer where actual system randomness is provided.

use crate::effects::RandomEffects;
use async_trait::async_trait;
use rand::RngCore;

/// Real random handler using the thread-local CSPRNG
#[derive(Debug, Clone, Default)]
pub struct RealRandomHandler;

impl RealRandomHandler {
    /// Create a new real random handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RandomEffects for RealRandomHandler {
    async fn random_bytes_16(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }
}
