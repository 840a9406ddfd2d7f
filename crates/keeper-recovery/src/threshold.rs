//! Approval threshold evaluation
//!
//! Quorum is a pure function of the approval count and the required count fixed
//! on the request. [`QuorumPolicy`] is the seam for alternative rules; the
//! workspace ships [`CountThreshold`], a plain k-of-n count.

use std::fmt::Debug;
use std::num::NonZeroU32;

/// `true` once `approval_count` reaches `required_approvals`.
pub fn is_satisfied(approval_count: usize, required_approvals: u32) -> bool {
    u64::try_from(approval_count).unwrap_or(u64::MAX) >= u64::from(required_approvals)
}

/// Decides how many approvals a new request needs and when it has enough.
pub trait QuorumPolicy: Debug + Send + Sync {
    /// Approvals a request opened now must collect.
    fn required_approvals(&self) -> NonZeroU32;

    /// Whether `approval_count` approvals satisfy a request that requires
    /// `required_approvals`.
    fn is_satisfied(&self, approval_count: usize, required_approvals: u32) -> bool {
        is_satisfied(approval_count, required_approvals)
    }
}

/// Fixed approval count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountThreshold {
    required: NonZeroU32,
}

impl CountThreshold {
    pub fn new(required: NonZeroU32) -> Self {
        Self { required }
    }

    /// `None` for a zero threshold.
    pub fn from_count(required: u32) -> Option<Self> {
        NonZeroU32::new(required).map(Self::new)
    }
}

impl Default for CountThreshold {
    fn default() -> Self {
        Self {
            required: NonZeroU32::MIN,
        }
    }
}

impl QuorumPolicy for CountThreshold {
    fn required_approvals(&self) -> NonZeroU32 {
        self.required
    }
}
