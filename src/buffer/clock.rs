//! Logical clock issuing the pool's event timestamps.

use std::fmt;

/// A point on the pool's logical clock.
///
/// Every bind, pin and unpin takes a fresh tick, so no two events share a
/// timestamp and ordering is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Monotonic counter owned by one buffer pool and advanced under its lock.
#[derive(Debug, Default)]
pub(crate) struct LogicalClock {
    next: u64,
}

impl LogicalClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Issue the next tick.
    pub(crate) fn tick(&mut self) -> Tick {
        let now = Tick(self.next);
        self.next += 1;
        now
    }
}
