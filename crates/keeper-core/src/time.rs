//! Physical time value type.

use serde::{Deserialize, Serialize};

/// Wall-clock reading in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Create from a millisecond timestamp.
    pub fn from_ms(ts_ms: u64) -> Self {
        Self { ts_ms }
    }
}
