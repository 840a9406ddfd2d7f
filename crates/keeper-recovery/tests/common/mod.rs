//! Shared harness for recovery integration tests
#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use keeper_core::AccountId;
use keeper_recovery::{
    AccountSnapshot, MemorySink, RecoveryConfig, RecoveryEvent, RecoveryService,
};
use keeper_testkit::{fixtures, MockEffects};
use std::sync::Arc;

pub struct Harness {
    pub effects: MockEffects,
    pub service: Arc<RecoveryService<MockEffects>>,
    pub sink: Arc<MemorySink>,
    pub account: AccountId,
}

impl Harness {
    /// Fresh account owned by [`fixtures::owner`] with no guardians.
    pub async fn new(config: RecoveryConfig) -> Self {
        let effects = MockEffects::deterministic();
        let sink = Arc::new(MemorySink::new());
        let service = RecoveryService::builder(Arc::new(effects.clone()))
            .config(config)
            .sink(sink.clone())
            .build()
            .unwrap();
        let account = service
            .create_account(fixtures::owner().as_str())
            .await
            .unwrap();

        Self {
            effects,
            service: Arc::new(service),
            sink,
            account,
        }
    }

    /// Account with `count` active guardians, `fixtures::guardian(0..count)`.
    pub async fn with_active_guardians(config: RecoveryConfig, count: u8) -> Self {
        let harness = Self::new(config).await;
        for index in 0..count {
            harness.add_active_guardian(index).await;
        }
        harness.sink.drain();
        harness
    }

    pub async fn add_active_guardian(&self, index: u8) {
        self.service
            .add_guardian(
                &self.account,
                &fixtures::owner(),
                &fixtures::guardian_address(index),
                &format!("Guardian {index}"),
            )
            .await
            .unwrap();
        self.service
            .activate_guardian(&self.account, &fixtures::guardian(index))
            .await
            .unwrap();
    }

    pub async fn snapshot(&self) -> AccountSnapshot {
        self.service.snapshot(&self.account).await.unwrap()
    }

    pub fn events(&self) -> Vec<RecoveryEvent> {
        self.sink.events()
    }
}

pub fn threshold(required: u32) -> RecoveryConfig {
    RecoveryConfig {
        threshold: required,
        ..RecoveryConfig::default()
    }
}
