//! Per-account serialization and cross-account independence
#![allow(clippy::unwrap_used)]

mod common;

use common::{threshold, Harness};
use futures::future::join_all;
use keeper_recovery::{RecoveryConfig, RecoveryError, RecoveryService, RecoveryStatus};
use keeper_testkit::{fixtures, MockEffects};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn concurrent_opens_admit_exactly_one_request() {
    let h = Harness::with_active_guardians(RecoveryConfig::default(), 1).await;

    let attempts = (0..4u8).map(|i| {
        let service = Arc::clone(&h.service);
        let account = h.account;
        tokio::spawn(async move {
            service
                .open_recovery(&account, &fixtures::owner(), &fixtures::address(0xe0 + i))
                .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let opened = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(RecoveryError::RequestNotActionable { .. })))
        .count();
    assert_eq!(opened, 1);
    assert_eq!(refused, 3);
    assert_eq!(
        h.effects
            .submitted_names()
            .iter()
            .filter(|name| **name == "initiate_recovery")
            .count(),
        1
    );
}

#[tokio::test]
async fn concurrent_approvals_are_applied_in_turn() {
    let h = Harness::with_active_guardians(threshold(3), 3).await;
    h.service
        .open_recovery(&h.account, &fixtures::owner(), &fixtures::new_owner_address())
        .await
        .unwrap();

    let approvals = (0..3u8).map(|i| {
        let service = Arc::clone(&h.service);
        let account = h.account;
        tokio::spawn(async move {
            service
                .approve_recovery(&account, &fixtures::guardian(i))
                .await
        })
    });
    for joined in join_all(approvals).await {
        joined.unwrap().unwrap();
    }

    let request = h.snapshot().await.record.recovery.unwrap();
    assert_eq!(request.status(), RecoveryStatus::Completed);
    assert_eq!(request.approvals().len(), 3);
    assert_eq!(h.snapshot().await.record.registry.owner(), &fixtures::new_owner());
}

#[tokio::test]
async fn stalled_account_does_not_block_others() {
    let effects = MockEffects::deterministic();
    let service = Arc::new(
        RecoveryService::builder(Arc::new(effects.clone()))
            .build()
            .unwrap(),
    );
    let busy = service.create_account(&fixtures::address(0x01)).await.unwrap();
    let idle = service.create_account(&fixtures::address(0x02)).await.unwrap();

    let idle_owner = fixtures::identity(0x02);
    service
        .add_guardian(&idle, &idle_owner, &fixtures::guardian_address(0), "Alice")
        .await
        .unwrap();

    effects.stall_executions();
    let stalled = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .add_guardian(
                    &busy,
                    &fixtures::identity(0x01),
                    &fixtures::guardian_address(0),
                    "Bob",
                )
                .await
        })
    };
    let mut busy_view = service.watch(&busy).await.unwrap();
    busy_view
        .wait_for(|snapshot| !snapshot.is_settled())
        .await
        .unwrap();

    // The idle account's lock is free while the busy one waits on its transaction
    let activated = tokio::time::timeout(
        Duration::from_secs(1),
        service.activate_guardian(&idle, &fixtures::guardian(0)),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(service
        .snapshot(&idle)
        .await
        .unwrap()
        .record
        .registry
        .is_active_guardian(&activated.id));

    effects.resume_executions();
    stalled.await.unwrap().unwrap();
    assert_eq!(service.snapshot(&busy).await.unwrap().record.registry.len(), 1);
}

#[tokio::test]
async fn many_accounts_progress_in_parallel() {
    let service = Arc::new(
        RecoveryService::builder(Arc::new(MockEffects::deterministic()))
            .build()
            .unwrap(),
    );

    let runs = (1..=8u8).map(|tag| {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            let owner = fixtures::identity(tag);
            let account = service.create_account(owner.as_str()).await?;
            service
                .add_guardian(&account, &owner, &fixtures::guardian_address(0), "Alice")
                .await?;
            service
                .activate_guardian(&account, &fixtures::guardian(0))
                .await?;
            service
                .open_recovery(&account, &owner, &fixtures::new_owner_address())
                .await?;
            service
                .approve_recovery(&account, &fixtures::guardian(0))
                .await
        })
    });

    for joined in join_all(runs).await {
        let request = joined.unwrap().unwrap();
        assert_eq!(request.status(), RecoveryStatus::Completed);
    }
    assert_eq!(service.accounts().await.unwrap().len(), 8);
}
