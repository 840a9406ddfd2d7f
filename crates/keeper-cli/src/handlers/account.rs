//! Account command handler.

use super::{render_guardian, render_request};
use crate::commands::AccountCommands;
use crate::context::CliContext;
use anyhow::Result;
use keeper_recovery::AccountSnapshot;
use std::fmt::Write;

pub async fn handle_account(ctx: &CliContext, command: &AccountCommands) -> Result<String> {
    match command {
        AccountCommands::Create { owner } => {
            let account = ctx.service().create_account(owner).await?;
            Ok(format!("created account {account}\nowner {owner}"))
        }
        AccountCommands::Show { account, json } => {
            let snapshot = ctx.service().snapshot(account).await?;
            if *json {
                Ok(serde_json::to_string_pretty(&snapshot.record)?)
            } else {
                Ok(render_snapshot(&snapshot))
            }
        }
        AccountCommands::List => {
            let accounts = ctx.service().accounts().await?;
            if accounts.is_empty() {
                return Ok("no accounts".to_string());
            }
            Ok(accounts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

fn render_snapshot(snapshot: &AccountSnapshot) -> String {
    let record = &snapshot.record;
    let registry = &record.registry;
    let mut out = format!(
        "account {}\nowner   {}\nguardians ({} registered, {} active)",
        record.account_id,
        registry.owner(),
        registry.len(),
        registry.active_count()
    );
    for guardian in registry.iter() {
        let _ = write!(out, "\n  {}", render_guardian(guardian));
    }
    match &record.recovery {
        Some(request) => {
            let _ = write!(out, "\n{}", render_request(request));
        }
        None => out.push_str("\nno recovery request"),
    }
    if let Some(operation) = &snapshot.in_flight {
        let _ = write!(out, "\nin flight: {operation}");
    }
    out
}
