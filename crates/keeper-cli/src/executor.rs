//! Local transaction executor
//!
//! Stands in for a chain connection when driving the service from the
//! command line. Every operation is logged, delayed by the configured latency,
//! and either confirmed or refused by name.

use crate::config::ExecutorConfig;
use async_trait::async_trait;
use keeper_core::effects::{ExecutionError, Operation, TransactionExecutor};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

/// Executor that confirms locally after a fixed latency
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor {
    latency: Duration,
    reject: HashSet<String>,
}

impl LocalExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            reject: config.reject.iter().cloned().collect(),
        }
    }
}

#[async_trait]
impl TransactionExecutor for LocalExecutor {
    async fn execute(&self, operation: &Operation) -> Result<(), ExecutionError> {
        info!(%operation, "submitting transaction");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.reject.contains(operation.name()) {
            info!(%operation, "transaction rejected");
            return Err(ExecutionError::rejected(format!(
                "{} is disabled by executor configuration",
                operation.name()
            )));
        }
        info!(%operation, "transaction confirmed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn confirms_unless_configured_to_reject() {
        let executor = LocalExecutor::new(&ExecutorConfig {
            latency_ms: 1,
            reject: vec!["cancel_recovery".into()],
        });

        assert!(executor.execute(&Operation::ApproveRecovery).await.is_ok());
        assert_matches!(
            executor.execute(&Operation::CancelRecovery).await,
            Err(ExecutionError::Rejected { ref reason }) if reason.contains("cancel_recovery")
        );
    }
}
