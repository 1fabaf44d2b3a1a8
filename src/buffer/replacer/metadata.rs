//! Per-frame bookkeeping consumed by the replacers.

use std::fmt;

use crate::buffer::clock::Tick;
use crate::common::EvictionPolicy;

/// Policy state attached to a bound frame.
///
/// Exactly one variant is in use per pool, matching its [`EvictionPolicy`].
/// The metadata is discarded when the frame is evicted and created afresh
/// when it is bound to its next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMetadata {
    /// When the frame was bound to its current block.
    Fifo { arrived_at: Tick },
    /// Pin and unpin events since binding, plus the binding time used to
    /// break ties.
    Lfu { uses: u64, arrived_at: Tick },
    /// Most recent bind, pin or unpin.
    Mru { last_touched: Tick },
}

impl PolicyMetadata {
    /// The policy this metadata belongs to.
    pub fn policy(&self) -> EvictionPolicy {
        match self {
            PolicyMetadata::Fifo { .. } => EvictionPolicy::Fifo,
            PolicyMetadata::Lfu { .. } => EvictionPolicy::Lfu,
            PolicyMetadata::Mru { .. } => EvictionPolicy::Mru,
        }
    }
}

impl fmt::Display for PolicyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyMetadata::Fifo { arrived_at } => write!(f, "fifo(arrived {})", arrived_at),
            PolicyMetadata::Lfu { uses, arrived_at } => {
                write!(f, "lfu(uses {}, arrived {})", uses, arrived_at)
            }
            PolicyMetadata::Mru { last_touched } => write!(f, "mru(touched {})", last_touched),
        }
    }
}
