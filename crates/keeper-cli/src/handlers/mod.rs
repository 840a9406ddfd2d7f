//! CLI command handlers
//!
//! Each handler runs one service operation and renders its result, followed by
//! the events the operation committed.

use keeper_recovery::{Guardian, Notification, RecoveryEvent, RecoveryRequest};
use std::fmt::Write;

pub mod account;
pub mod config;
pub mod guardian;
pub mod recovery;

pub(crate) fn render_guardian(guardian: &Guardian) -> String {
    format!(
        "{}  {}  {}",
        guardian.id, guardian.display_name, guardian.status
    )
}

pub(crate) fn render_request(request: &RecoveryRequest) -> String {
    let (approvals, required) = request.progress();
    let mut out = format!(
        "request {}\nstatus    {}\ntarget    {}\ninitiator {}\nprogress  {approvals} of {required} required",
        request.id(),
        request.status(),
        request.target_new_owner(),
        request.initiated_by(),
    );
    for approval in request.approvals() {
        let _ = write!(
            out,
            "\n  approved by {} at {}",
            approval.guardian_id, approval.approved_at_ms
        );
    }
    out
}

fn describe(event: &RecoveryEvent) -> String {
    match event {
        RecoveryEvent::GuardianAdded { guardian } => format!(
            "guardian added: {} ({}, {})",
            guardian.id, guardian.display_name, guardian.status
        ),
        RecoveryEvent::GuardianActivated { guardian } => {
            format!("guardian activated: {guardian}")
        }
        RecoveryEvent::GuardianRemoved { guardian } => format!("guardian removed: {guardian}"),
        RecoveryEvent::RecoveryOpened {
            request,
            target_new_owner,
            required_approvals,
            ..
        } => format!(
            "recovery {request} opened for {target_new_owner}, {required_approvals} approval(s) required"
        ),
        RecoveryEvent::RecoveryApproved {
            request,
            guardian,
            approvals,
            required,
        } => format!("recovery {request} approved by {guardian} ({approvals} of {required})"),
        RecoveryEvent::RecoveryCompleted { request, new_owner } => {
            format!("recovery {request} completed, owner is now {new_owner}")
        }
        RecoveryEvent::RecoveryCancelled {
            request,
            cancelled_by,
        } => format!("recovery {request} cancelled by {cancelled_by}"),
    }
}

/// Append committed events to a rendered result.
pub(crate) fn with_events(mut out: String, events: &[Notification]) -> String {
    for notification in events {
        let _ = write!(out, "\nevent: {}", describe(&notification.event));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::{AccountId, IdentityRef, RequestId};
    use uuid::Uuid;

    #[test]
    fn events_render_one_line_each() {
        let request = RequestId::from_uuid(Uuid::nil());
        let events = vec![
            Notification {
                account_id: AccountId::from_uuid(Uuid::nil()),
                event: RecoveryEvent::RecoveryApproved {
                    request,
                    guardian: IdentityRef::new("0xb0"),
                    approvals: 1,
                    required: 2,
                },
            },
            Notification {
                account_id: AccountId::from_uuid(Uuid::nil()),
                event: RecoveryEvent::RecoveryCompleted {
                    request,
                    new_owner: IdentityRef::new("0xee"),
                },
            },
        ];

        let out = with_events("done".to_string(), &events);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("approved by 0xb0 (1 of 2)"));
        assert!(lines[2].ends_with("owner is now 0xee"));
    }
}
