//! CLI effect handler
//!
//! Composes the production time and randomness handlers from keeper-core with
//! the [`LocalExecutor`] into one value satisfying `RecoveryEffects`.

use crate::executor::LocalExecutor;
use async_trait::async_trait;
use keeper_core::effects::{
    ExecutionError, Operation, PhysicalTimeEffects, RandomEffects, TimeError, TransactionExecutor,
};
use keeper_core::handlers::{RealRandomHandler, RealTimeHandler};
use keeper_core::PhysicalTime;

/// Effect handler wired by the `keeper` binary
#[derive(Debug, Clone, Default)]
pub struct LocalEffects {
    time: RealTimeHandler,
    random: RealRandomHandler,
    executor: LocalExecutor,
}

impl LocalEffects {
    pub fn new(executor: LocalExecutor) -> Self {
        Self {
            time: RealTimeHandler::new(),
            random: RealRandomHandler::new(),
            executor,
        }
    }
}

#[async_trait]
impl PhysicalTimeEffects for LocalEffects {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        self.time.physical_time().await
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        self.time.sleep_ms(ms).await
    }
}

#[async_trait]
impl RandomEffects for LocalEffects {
    async fn random_bytes_16(&self) -> [u8; 16] {
        self.random.random_bytes_16().await
    }
}

#[async_trait]
impl TransactionExecutor for LocalEffects {
    async fn execute(&self, operation: &Operation) -> Result<(), ExecutionError> {
        self.executor.execute(operation).await
    }
}
