//! Eviction policy implementations (replacers).
//!
//! A replacer owns no frames. The pool tells it about bind, pin and unpin
//! events so it can maintain each frame's [`PolicyMetadata`], and asks it
//! to pick a victim among the currently unpinned frames.
//!
//! Implementations:
//! - [`FifoReplacer`] - earliest bound frame
//! - [`LfuReplacer`] - fewest pin/unpin events
//! - [`MruReplacer`] - most recently touched frame

mod fifo;
mod lfu;
mod metadata;
mod mru;

pub use fifo::FifoReplacer;
pub use lfu::LfuReplacer;
pub use metadata::PolicyMetadata;
pub use mru::MruReplacer;

use crate::buffer::clock::Tick;
use crate::common::{BlockId, EvictionPolicy};

/// An unpinned resident frame offered to [`Replacer::select_victim`].
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub block: &'a BlockId,
    pub metadata: PolicyMetadata,
}

/// Victim-selection strategy of a buffer pool.
///
/// All methods are called with the pool lock held.
pub trait Replacer: Send {
    fn policy(&self) -> EvictionPolicy;

    /// Metadata for a frame that was just bound to a block at `now`.
    fn on_bind(&self, now: Tick) -> PolicyMetadata;

    /// Update a frame's metadata after a successful pin.
    fn on_pin(&self, metadata: &mut PolicyMetadata, now: Tick);

    /// Update a frame's metadata after an unpin.
    fn on_unpin(&self, metadata: &mut PolicyMetadata, now: Tick);

    /// Index of the candidate to evict, or `None` if `candidates` is empty.
    fn select_victim(&self, candidates: &[Candidate<'_>]) -> Option<usize>;
}

/// Build the replacer for a policy.
pub fn for_policy(policy: EvictionPolicy) -> Box<dyn Replacer> {
    match policy {
        EvictionPolicy::Fifo => Box::new(FifoReplacer::new()),
        EvictionPolicy::Lfu => Box::new(LfuReplacer::new()),
        EvictionPolicy::Mru => Box::new(MruReplacer::new()),
    }
}
