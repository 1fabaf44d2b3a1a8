//! FIFO (First-In-First-Out) replacement policy.

use super::{Candidate, PolicyMetadata, Replacer};
use crate::buffer::clock::Tick;
use crate::common::EvictionPolicy;

/// Evicts the unpinned frame that was bound to its block earliest.
///
/// Arrival reflects residency, not access: it is stamped when the frame is
/// bound and never refreshed by later pins or unpins.
#[derive(Debug, Default, Clone, Copy)]
pub struct FifoReplacer;

impl FifoReplacer {
    pub fn new() -> Self {
        Self
    }
}

impl Replacer for FifoReplacer {
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Fifo
    }

    fn on_bind(&self, now: Tick) -> PolicyMetadata {
        PolicyMetadata::Fifo { arrived_at: now }
    }

    fn on_pin(&self, _metadata: &mut PolicyMetadata, _now: Tick) {}

    fn on_unpin(&self, _metadata: &mut PolicyMetadata, _now: Tick) {}

    fn select_victim(&self, candidates: &[Candidate<'_>]) -> Option<usize> {
        // min_by_key keeps the first of equal keys
        candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| match c.metadata {
                PolicyMetadata::Fifo { arrived_at } => Some((idx, arrived_at)),
                _ => None,
            })
            .min_by_key(|&(_, arrived_at)| arrived_at)
            .map(|(idx, _)| idx)
    }
}
