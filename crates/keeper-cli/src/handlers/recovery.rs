//! Recovery command handler.

use super::{render_request, with_events};
use crate::commands::RecoveryCommands;
use crate::context::CliContext;
use anyhow::Result;

pub async fn handle_recovery(ctx: &CliContext, command: &RecoveryCommands) -> Result<String> {
    let service = ctx.service();
    let request = match command {
        RecoveryCommands::Open { account, new_owner } => {
            service
                .open_recovery(account, &ctx.caller()?, new_owner)
                .await?
        }
        RecoveryCommands::Approve { account } => {
            service.approve_recovery(account, &ctx.caller()?).await?
        }
        RecoveryCommands::Cancel { account } => {
            service.cancel_recovery(account, &ctx.caller()?).await?
        }
        RecoveryCommands::Acknowledge { account } => {
            let request = service
                .acknowledge_recovery(account, &ctx.caller()?)
                .await?;
            return Ok(format!(
                "cleared request {} ({})",
                request.id(),
                request.status()
            ));
        }
        RecoveryCommands::Status { account } => {
            let snapshot = service.snapshot(account).await?;
            return Ok(snapshot
                .record
                .recovery
                .as_ref()
                .map_or_else(|| "no recovery request".to_string(), render_request));
        }
    };
    Ok(with_events(render_request(&request), &ctx.take_events()))
}
