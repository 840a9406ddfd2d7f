//! Guardian command handler.

use super::{render_guardian, with_events};
use crate::commands::GuardianCommands;
use crate::context::CliContext;
use anyhow::Result;
use keeper_recovery::{PermissionGuard, RequiredRole};

pub async fn handle_guardian(ctx: &CliContext, command: &GuardianCommands) -> Result<String> {
    let service = ctx.service();
    let out = match command {
        GuardianCommands::Add {
            account,
            address,
            name,
        } => {
            let caller = ctx.caller()?;
            let guardian = service.add_guardian(account, &caller, address, name).await?;
            format!("added {}", render_guardian(&guardian))
        }
        GuardianCommands::Activate { account, address } => {
            // Manual confirmation stands in for the transaction layer, so only
            // the owner may give it.
            let caller = ctx.caller()?;
            let guardian = ctx.guardian_address(address)?;
            let snapshot = service.snapshot(account).await?;
            PermissionGuard::require(&caller, RequiredRole::Owner, &snapshot.record.registry)?;
            let guardian = service.activate_guardian(account, &guardian).await?;
            format!("activated {}", render_guardian(&guardian))
        }
        GuardianCommands::Remove { account, address } => {
            let caller = ctx.caller()?;
            let guardian = ctx.guardian_address(address)?;
            service.remove_guardian(account, &caller, &guardian).await?;
            format!("removed {address}")
        }
        GuardianCommands::List { account } => {
            let snapshot = service.snapshot(account).await?;
            let registry = &snapshot.record.registry;
            if registry.is_empty() {
                return Ok("no guardians".to_string());
            }
            registry
                .iter()
                .map(render_guardian)
                .collect::<Vec<_>>()
                .join("\n")
        }
    };
    Ok(with_events(out, &ctx.take_events()))
}
