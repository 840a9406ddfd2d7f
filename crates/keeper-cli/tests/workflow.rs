//! End-to-end command runs against a temporary store
#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use clap::Parser;
use keeper_cli::{Cli, CliError};
use keeper_recovery::{GuardianStatus, RecoveryError, RequiredRole};
use keeper_testkit::fixtures;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new(extra_config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("keeper.toml");
        let store_dir = dir.path().join("store");
        std::fs::write(
            &config,
            format!("store_dir = '{}'\n{extra_config}", store_dir.display()),
        )
        .unwrap();
        Self { _dir: dir, config }
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let config = self.config.to_string_lossy().into_owned();
        let argv = ["keeper", "--config", config.as_str()]
            .into_iter()
            .chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv)?;
        keeper_cli::run(&cli).await
    }

    async fn create_account(&self) -> String {
        let out = self
            .run(&["account", "create", "--owner", fixtures::owner().as_str()])
            .await
            .unwrap();
        out.lines()
            .next()
            .and_then(|line| line.strip_prefix("created account "))
            .unwrap()
            .to_string()
    }
}

#[tokio::test]
async fn recovery_completes_across_invocations() {
    let ws = Workspace::new("");
    let account = ws.create_account().await;
    let owner = fixtures::owner();
    let guardian = fixtures::guardian_address(0);
    let new_owner = fixtures::new_owner_address();

    let added = ws
        .run(&[
            "guardian", "add", "--account", &account, "--address", &guardian, "--name", "Alice",
            "--as", owner.as_str(),
        ])
        .await
        .unwrap();
    assert!(added.contains("pending"));
    assert!(added.contains("event: guardian added"));

    ws.run(&[
        "guardian", "activate", "--account", &account, "--address", &guardian, "--as",
        owner.as_str(),
    ])
    .await
    .unwrap();

    let opened = ws
        .run(&[
            "recovery", "open", "--account", &account, "--new-owner", &new_owner, "--as",
            owner.as_str(),
        ])
        .await
        .unwrap();
    assert!(opened.contains("progress  0 of 1 required"));

    let approved = ws
        .run(&["recovery", "approve", "--account", &account, "--as", &guardian])
        .await
        .unwrap();
    assert!(approved.contains("status    completed"));
    assert!(approved.contains(&format!("owner is now {new_owner}")));

    let shown = ws
        .run(&["account", "show", "--account", &account])
        .await
        .unwrap();
    assert!(shown.contains(&format!("owner   {new_owner}")));

    let cleared = ws
        .run(&["recovery", "acknowledge", "--account", &account, "--as", &new_owner])
        .await
        .unwrap();
    assert!(cleared.contains("completed"));
    assert_eq!(
        ws.run(&["recovery", "status", "--account", &account])
            .await
            .unwrap(),
        "no recovery request"
    );
}

#[tokio::test]
async fn mutating_commands_need_a_caller() {
    let ws = Workspace::new("");
    let account = ws.create_account().await;

    let err = ws
        .run(&[
            "guardian",
            "add",
            "--account",
            &account,
            "--address",
            &fixtures::guardian_address(0),
            "--name",
            "Alice",
        ])
        .await
        .unwrap_err();
    assert_matches!(err.downcast_ref::<CliError>(), Some(CliError::MissingCaller));
}

#[tokio::test]
async fn only_the_owner_confirms_a_pending_guardian() {
    let ws = Workspace::new("");
    let account = ws.create_account().await;
    let owner = fixtures::owner();
    let guardian = fixtures::guardian_address(0);
    let stranger = fixtures::stranger();

    ws.run(&[
        "guardian", "add", "--account", &account, "--address", &guardian, "--name", "Alice",
        "--as", owner.as_str(),
    ])
    .await
    .unwrap();

    let err = ws
        .run(&["guardian", "activate", "--account", &account, "--address", &guardian])
        .await
        .unwrap_err();
    assert_matches!(err.downcast_ref::<CliError>(), Some(CliError::MissingCaller));

    let err = ws
        .run(&[
            "guardian", "activate", "--account", &account, "--address", &guardian, "--as",
            stranger.as_str(),
        ])
        .await
        .unwrap_err();
    assert_matches!(
        err.downcast_ref::<RecoveryError>(),
        Some(RecoveryError::Unauthorized { caller, required: RequiredRole::Owner })
            if caller == &stranger
    );

    let listed = ws
        .run(&["guardian", "list", "--account", &account])
        .await
        .unwrap();
    assert!(listed.contains(&GuardianStatus::Pending.to_string()));
}

#[tokio::test]
async fn guardian_addresses_are_validated_before_use() {
    let ws = Workspace::new("");
    let account = ws.create_account().await;
    let owner = fixtures::owner();

    for action in ["activate", "remove"] {
        let err = ws
            .run(&[
                "guardian", action, "--account", &account, "--address", "0x12", "--as",
                owner.as_str(),
            ])
            .await
            .unwrap_err();
        assert_matches!(
            err.downcast_ref::<RecoveryError>(),
            Some(RecoveryError::InvalidAddress { candidate }) if candidate == "0x12"
        );
    }
}

#[tokio::test]
async fn rejected_transaction_leaves_store_unchanged() {
    let ws = Workspace::new("[executor]\nreject = [\"add_guardian\"]\n");
    let account = ws.create_account().await;

    let err = ws
        .run(&[
            "guardian",
            "add",
            "--account",
            &account,
            "--address",
            &fixtures::guardian_address(0),
            "--name",
            "Alice",
            "--as",
            fixtures::owner().as_str(),
        ])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("add_guardian"));

    assert_eq!(
        ws.run(&["guardian", "list", "--account", &account])
            .await
            .unwrap(),
        "no guardians"
    );
}

#[tokio::test]
async fn accounts_are_listed_from_the_store() {
    let ws = Workspace::new("");
    assert_eq!(ws.run(&["account", "list"]).await.unwrap(), "no accounts");

    let account = ws.create_account().await;
    assert_eq!(ws.run(&["account", "list"]).await.unwrap(), account);

    let json = ws
        .run(&["account", "show", "--account", &account, "--json"])
        .await
        .unwrap();
    let record: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(record["account_id"], account.as_str());
}

#[tokio::test]
async fn config_command_prints_effective_settings() {
    let ws = Workspace::new("[recovery]\nthreshold = 3\n");
    let out = ws.run(&["config"]).await.unwrap();
    assert!(out.contains("threshold = 3"));
}
