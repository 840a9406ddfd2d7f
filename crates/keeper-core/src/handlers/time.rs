//! Time effect handler backed by the system clock.

use crate::effects::{PhysicalTimeEffects, TimeError};
use crate::time::PhysicalTime;
use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Real time handler for production use
///
/// Reads the system clock and sleeps on the Tokio timer.
#[derive(Debug, Clone, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TimeError::OperationFailed {
                reason: format!("system clock before Unix epoch: {e}"),
            })?;
        Ok(PhysicalTime::from_ms(elapsed.as_millis() as u64))
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn physical_time_is_after_2020() {
        let now = RealTimeHandler::new().physical_time().await.unwrap();
        assert!(now.ts_ms > 1_577_836_800_000);
    }

    #[tokio::test]
    async fn physical_time_does_not_go_backwards() {
        let handler = RealTimeHandler::new();
        let first = handler.physical_time().await.unwrap();
        handler.sleep_ms(2).await.unwrap();
        let second = handler.physical_time().await.unwrap();
        assert!(second >= first);
    }
}
