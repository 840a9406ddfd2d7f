//! Recovery request and its status machine
//!
//! ```text
//! Pending ──(quorum reached, transfer in flight)──> Approved ──(confirmed)──> Completed
//!    │
//!    └──(cancel)──> Cancelled
//! ```
//!
//! `Rejected` is part of the persisted vocabulary but no operation produces it.
//! `Completed`, `Rejected` and `Cancelled` are terminal.

use crate::error::{RecoveryError, RecoveryResult};
use crate::threshold::QuorumPolicy;
use keeper_core::{IdentityRef, RequestId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Status of a recovery request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// Collecting approvals
    Pending,
    /// Quorum reached, ownership transfer awaiting confirmation
    Approved,
    /// Ownership transferred
    Completed,
    /// Reserved; never produced
    Rejected,
    /// Abandoned by the owner or the initiator
    Cancelled,
}

impl RecoveryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RecoveryStatus::Completed | RecoveryStatus::Rejected | RecoveryStatus::Cancelled
        )
    }
}

impl fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecoveryStatus::Pending => "pending",
            RecoveryStatus::Approved => "approved",
            RecoveryStatus::Completed => "completed",
            RecoveryStatus::Rejected => "rejected",
            RecoveryStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// One guardian's approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub guardian_id: IdentityRef,
    /// Epoch milliseconds when the approval was recorded
    pub approved_at_ms: u64,
}

/// Result of recording an approval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Counted, quorum not yet reached
    Recorded { approvals: usize, required: u32 },
    /// This approval reached quorum
    QuorumReached { approvals: usize, required: u32 },
}

impl ApprovalOutcome {
    pub fn quorum_reached(self) -> bool {
        matches!(self, ApprovalOutcome::QuorumReached { .. })
    }

    /// `(approvals, required)` after this approval.
    pub fn progress(self) -> (usize, u32) {
        match self {
            ApprovalOutcome::Recorded {
                approvals,
                required,
            }
            | ApprovalOutcome::QuorumReached {
                approvals,
                required,
            } => (approvals, required),
        }
    }
}

/// A single attempt to move ownership to a new address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRequest {
    id: RequestId,
    target_new_owner: IdentityRef,
    initiated_by: IdentityRef,
    initiated_at_ms: u64,
    required_approvals: u32,
    approvals: Vec<Approval>,
    status: RecoveryStatus,
}

impl RecoveryRequest {
    /// A fresh `Pending` request with no approvals.
    pub fn new(
        id: RequestId,
        target_new_owner: IdentityRef,
        initiated_by: IdentityRef,
        initiated_at_ms: u64,
        required_approvals: NonZeroU32,
    ) -> Self {
        Self {
            id,
            target_new_owner,
            initiated_by,
            initiated_at_ms,
            required_approvals: required_approvals.get(),
            approvals: Vec::new(),
            status: RecoveryStatus::Pending,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn target_new_owner(&self) -> &IdentityRef {
        &self.target_new_owner
    }

    pub fn initiated_by(&self) -> &IdentityRef {
        &self.initiated_by
    }

    pub fn initiated_at_ms(&self) -> u64 {
        self.initiated_at_ms
    }

    /// Fixed when the request was opened.
    pub fn required_approvals(&self) -> u32 {
        self.required_approvals
    }

    /// Approvals in the order they were recorded.
    pub fn approvals(&self) -> &[Approval] {
        &self.approvals
    }

    pub fn status(&self) -> RecoveryStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_approved(&self, guardian: &IdentityRef) -> bool {
        self.approvals
            .iter()
            .any(|approval| &approval.guardian_id == guardian)
    }

    /// `(approvals, required)` for progress display.
    pub fn progress(&self) -> (usize, u32) {
        (self.approvals.len(), self.required_approvals)
    }

    /// Fails unless the request is still collecting approvals.
    pub fn ensure_pending(&self) -> RecoveryResult<()> {
        if self.status == RecoveryStatus::Pending {
            Ok(())
        } else {
            Err(RecoveryError::not_actionable(self.id, self.status))
        }
    }

    /// Record `guardian`'s approval and move to `Approved` once `quorum` is met.
    ///
    /// Role checks are the caller's job; this only enforces the request's own
    /// invariants.
    pub(crate) fn record_approval(
        &mut self,
        guardian: &IdentityRef,
        approved_at_ms: u64,
        quorum: &dyn QuorumPolicy,
    ) -> RecoveryResult<ApprovalOutcome> {
        self.ensure_pending()?;
        if self.has_approved(guardian) {
            return Err(RecoveryError::AlreadyApproved {
                guardian: guardian.clone(),
                request: self.id,
            });
        }

        self.approvals.push(Approval {
            guardian_id: guardian.clone(),
            approved_at_ms,
        });

        let (approvals, required) = self.progress();
        if quorum.is_satisfied(approvals, required) {
            self.status = RecoveryStatus::Approved;
            Ok(ApprovalOutcome::QuorumReached {
                approvals,
                required,
            })
        } else {
            Ok(ApprovalOutcome::Recorded {
                approvals,
                required,
            })
        }
    }

    /// `Approved` to `Completed` once the transfer is confirmed.
    pub(crate) fn complete(&mut self) -> RecoveryResult<()> {
        if self.status != RecoveryStatus::Approved {
            return Err(RecoveryError::not_actionable(self.id, self.status));
        }
        self.status = RecoveryStatus::Completed;
        Ok(())
    }

    pub(crate) fn cancel(&mut self) -> RecoveryResult<()> {
        self.ensure_pending()?;
        self.status = RecoveryStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::CountThreshold;
    use assert_matches::assert_matches;

    fn request(required: u32) -> RecoveryRequest {
        RecoveryRequest::new(
            RequestId::from_uuid(uuid::Uuid::from_bytes([1u8; 16])),
            IdentityRef::new("0x2222222222222222222222222222222222222222"),
            IdentityRef::new("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            1_000,
            NonZeroU32::new(required).unwrap(),
        )
    }

    fn guardian(tag: char) -> IdentityRef {
        IdentityRef::new(format!("0x{}", tag.to_string().repeat(40)))
    }

    #[test]
    fn new_request_is_pending_and_empty() {
        let req = request(2);
        assert_eq!(req.status(), RecoveryStatus::Pending);
        assert_eq!(req.progress(), (0, 2));
        assert!(!req.is_terminal());
    }

    #[test]
    fn quorum_moves_request_to_approved() {
        let mut req = request(2);
        let quorum = CountThreshold::default();

        let first = req.record_approval(&guardian('a'), 10, &quorum).unwrap();
        assert_eq!(first, ApprovalOutcome::Recorded { approvals: 1, required: 2 });
        assert_eq!(req.status(), RecoveryStatus::Pending);

        let second = req.record_approval(&guardian('b'), 20, &quorum).unwrap();
        assert!(second.quorum_reached());
        assert_eq!(req.status(), RecoveryStatus::Approved);

        req.complete().unwrap();
        assert_eq!(req.status(), RecoveryStatus::Completed);
        assert!(req.is_terminal());
        let order: Vec<_> = req.approvals().iter().map(|a| a.approved_at_ms).collect();
        assert_eq!(order, vec![10, 20]);
    }

    #[test]
    fn duplicate_approval_is_refused() {
        let mut req = request(3);
        let quorum = CountThreshold::default();
        req.record_approval(&guardian('a'), 10, &quorum).unwrap();

        assert_matches!(
            req.record_approval(&guardian('a'), 11, &quorum),
            Err(RecoveryError::AlreadyApproved { .. })
        );
        assert_eq!(req.progress(), (1, 3));
    }

    #[test]
    fn terminal_requests_refuse_changes() {
        let mut req = request(1);
        req.cancel().unwrap();
        assert_eq!(req.status(), RecoveryStatus::Cancelled);

        assert_matches!(req.cancel(), Err(RecoveryError::RequestNotActionable { .. }));
        assert_matches!(
            req.record_approval(&guardian('a'), 1, &CountThreshold::default()),
            Err(RecoveryError::RequestNotActionable { .. })
        );
        assert_matches!(req.complete(), Err(RecoveryError::RequestNotActionable { .. }));
    }

    #[test]
    fn only_completed_rejected_and_cancelled_are_terminal() {
        assert!(!RecoveryStatus::Pending.is_terminal());
        assert!(!RecoveryStatus::Approved.is_terminal());
        assert!(RecoveryStatus::Completed.is_terminal());
        assert!(RecoveryStatus::Rejected.is_terminal());
        assert!(RecoveryStatus::Cancelled.is_terminal());
    }
}
