//! MRU (Most-Recently-Used) replacement policy.
//!
//! Useful for repeated sequential scans larger than the pool, where the
//! page just used is the one least likely to be needed again soon.

use super::{Candidate, PolicyMetadata, Replacer};
use crate::buffer::clock::Tick;
use crate::common::EvictionPolicy;

/// Evicts the unpinned frame with the latest bind, pin or unpin.
#[derive(Debug, Default, Clone, Copy)]
pub struct MruReplacer;

impl MruReplacer {
    pub fn new() -> Self {
        Self
    }

    fn touch(metadata: &mut PolicyMetadata, now: Tick) {
        if let PolicyMetadata::Mru { last_touched } = metadata {
            *last_touched = now;
        }
    }
}

impl Replacer for MruReplacer {
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Mru
    }

    fn on_bind(&self, now: Tick) -> PolicyMetadata {
        PolicyMetadata::Mru { last_touched: now }
    }

    fn on_pin(&self, metadata: &mut PolicyMetadata, now: Tick) {
        Self::touch(metadata, now);
    }

    fn on_unpin(&self, metadata: &mut PolicyMetadata, now: Tick) {
        Self::touch(metadata, now);
    }

    fn select_victim(&self, candidates: &[Candidate<'_>]) -> Option<usize> {
        // max_by_key keeps the last of equal keys
        candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| match c.metadata {
                PolicyMetadata::Mru { last_touched } => Some((idx, last_touched)),
                _ => None,
            })
            .max_by_key(|&(_, last_touched)| last_touched)
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BlockId;

    fn candidate(block: &BlockId, touched: u64) -> Candidate<'_> {
        Candidate {
            block,
            metadata: PolicyMetadata::Mru { last_touched: Tick(touched) },
        }
    }

    #[test]
    fn test_mru_picks_latest_touch() {
        let (a, b, c) = (BlockId::new("f", 0), BlockId::new("f", 1), BlockId::new("f", 2));
        let candidates = [candidate(&a, 3), candidate(&b, 12), candidate(&c, 7)];

        assert_eq!(MruReplacer::new().select_victim(&candidates), Some(1));
    }

    #[test]
    fn test_mru_refreshes_on_pin_and_unpin() {
        let replacer = MruReplacer::new();
        let mut meta = replacer.on_bind(Tick(1));

        replacer.on_pin(&mut meta, Tick(4));
        assert_eq!(meta, PolicyMetadata::Mru { last_touched: Tick(4) });

        replacer.on_unpin(&mut meta, Tick(6));
        assert_eq!(meta, PolicyMetadata::Mru { last_touched: Tick(6) });
    }

    #[test]
    fn test_mru_tie_keeps_last_encountered() {
        let (a, b) = (BlockId::new("f", 0), BlockId::new("f", 1));
        let candidates = [candidate(&a, 5), candidate(&b, 5)];

        assert_eq!(MruReplacer::new().select_victim(&candidates), Some(1));
    }
}
