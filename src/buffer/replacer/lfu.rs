//! LFU (Least-Frequently-Used) replacement policy.

use super::{Candidate, PolicyMetadata, Replacer};
use crate::buffer::clock::Tick;
use crate::common::EvictionPolicy;

/// Evicts the unpinned frame with the fewest pin and unpin events since it
/// was bound.
///
/// The use counter starts at zero on binding, grows on every pin and every
/// unpin, and is never reset while the frame keeps its block. Equal counts
/// are broken by earliest binding.
#[derive(Debug, Default, Clone, Copy)]
pub struct LfuReplacer;

impl LfuReplacer {
    pub fn new() -> Self {
        Self
    }

    fn count_use(metadata: &mut PolicyMetadata) {
        if let PolicyMetadata::Lfu { uses, .. } = metadata {
            *uses += 1;
        }
    }
}

impl Replacer for LfuReplacer {
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Lfu
    }

    fn on_bind(&self, now: Tick) -> PolicyMetadata {
        PolicyMetadata::Lfu {
            uses: 0,
            arrived_at: now,
        }
    }

    fn on_pin(&self, metadata: &mut PolicyMetadata, _now: Tick) {
        Self::count_use(metadata);
    }

    fn on_unpin(&self, metadata: &mut PolicyMetadata, _now: Tick) {
        Self::count_use(metadata);
    }

    fn select_victim(&self, candidates: &[Candidate<'_>]) -> Option<usize> {
        candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| match c.metadata {
                PolicyMetadata::Lfu { uses, arrived_at } => Some((idx, (uses, arrived_at))),
                _ => None,
            })
            .min_by_key(|&(_, key)| key)
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BlockId;

    fn candidate(block: &BlockId, uses: u64, arrived: u64) -> Candidate<'_> {
        Candidate {
            block,
            metadata: PolicyMetadata::Lfu {
                uses,
                arrived_at: Tick(arrived),
            },
        }
    }

    #[test]
    fn test_lfu_counts_pins_and_unpins() {
        let replacer = LfuReplacer::new();
        let mut meta = replacer.on_bind(Tick(0));

        replacer.on_pin(&mut meta, Tick(1));
        replacer.on_unpin(&mut meta, Tick(2));

        assert_eq!(meta, PolicyMetadata::Lfu { uses: 2, arrived_at: Tick(0) });
    }

    #[test]
    fn test_lfu_picks_fewest_uses() {
        let (hot, cold) = (BlockId::new("f", 0), BlockId::new("f", 1));
        let candidates = [candidate(&hot, 10, 0), candidate(&cold, 2, 5)];

        assert_eq!(LfuReplacer::new().select_victim(&candidates), Some(1));
    }

    #[test]
    fn test_lfu_tie_goes_to_earliest_binding() {
        let (a, b, c) = (BlockId::new("f", 0), BlockId::new("f", 1), BlockId::new("f", 2));
        let candidates = [candidate(&a, 2, 8), candidate(&b, 2, 3), candidate(&c, 4, 1)];

        assert_eq!(LfuReplacer::new().select_victim(&candidates), Some(1));
    }
}
