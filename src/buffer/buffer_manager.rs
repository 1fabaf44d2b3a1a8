//! Buffer Manager - the pinning layer between callers and disk blocks.
//!
//! The [`BufferManager`] provides:
//! - Block caching with pin-based reference counting
//! - Write-back of modified blocks, per transaction or on eviction
//! - One of three eviction policies, chosen at construction

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::clock::LogicalClock;
use crate::buffer::replacer::{self, Candidate, PolicyMetadata, Replacer};
use crate::buffer::{Buffer, BufferPoolStats, PinGuard};
use crate::common::{BlockId, BufferPoolConfig, Error, EvictionPolicy, Result, TxnId};
use crate::storage::{FileManager, PageFormatter};

/// State mutated only under the pool lock.
struct PoolState {
    /// Every bound frame, keyed by its block.
    resident: HashMap<BlockId, Arc<Buffer>>,
    clock: LogicalClock,
    replacer: Box<dyn Replacer>,
}

/// Manages a capacity-bounded pool of buffers for disk blocks.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                       BufferManager                          │
/// │  ┌───────────────── Mutex<PoolState> ─────────────────────┐  │
/// │  │ resident: BlockId → Arc<Buffer>   (≤ capacity entries) │  │
/// │  │ clock: LogicalClock               replacer: FIFO|LFU|MRU│ │
/// │  └────────────────────────────────────────────────────────┘  │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐    │
/// │  │  available   │  │    stats     │  │ Arc<FileManager> │    │
/// │  │ AtomicUsize  │  │   atomics    │  │                  │    │
/// │  └──────────────┘  └──────────────┘  └──────────────────┘    │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// `pin`, `pin_new`, `unpin` and `flush_all` run under one mutex, so at
/// most one of them proceeds at a time. `available()` and the statistics
/// are lock-free and may be momentarily stale. No call waits for a frame
/// to become free: when every frame is pinned, `pin` fails immediately
/// with `Error::PoolExhausted`.
///
/// # Usage
/// ```no_run
/// # fn main() -> blockbuf::Result<()> {
/// use std::sync::Arc;
/// use blockbuf::{BlockId, BufferManager, BufferPoolConfig, EvictionPolicy, TxnId};
/// use blockbuf::storage::FileManager;
///
/// let files = Arc::new(FileManager::open("dbdir")?);
/// let bm = BufferManager::new(BufferPoolConfig::new(8, EvictionPolicy::Lfu), files)?;
///
/// let buffer = bm.pin(&BlockId::new("students.tbl", 0))?;
/// buffer.contents_mut().payload_mut()[0] = 0xAB;
/// buffer.set_modified(TxnId::new(1), None);
/// bm.unpin(&buffer)?;
///
/// bm.flush_all(TxnId::new(1))?;
/// # Ok(())
/// # }
/// ```
pub struct BufferManager {
    state: Mutex<PoolState>,

    /// Mirror of `capacity - resident.len()`, published under the lock.
    available: AtomicUsize,

    files: Arc<FileManager>,
    config: BufferPoolConfig,
    stats: BufferPoolStats,
}

impl BufferManager {
    /// Create a new buffer manager.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the capacity is 0
    pub fn new(config: BufferPoolConfig, files: Arc<FileManager>) -> Result<Self> {
        config.validate()?;
        debug!(capacity = config.capacity, policy = %config.policy, "buffer manager created");

        Ok(Self {
            state: Mutex::new(PoolState {
                resident: HashMap::with_capacity(config.capacity),
                clock: LogicalClock::new(),
                replacer: replacer::for_policy(config.policy),
            }),
            available: AtomicUsize::new(config.capacity),
            files,
            config,
            stats: BufferPoolStats::new(),
        })
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a block, reading it into a frame if it isn't resident.
    ///
    /// Pinning a resident block returns the same buffer with its pin count
    /// incremented. Otherwise a fresh frame is used while capacity remains,
    /// else the policy's victim among unpinned frames is evicted (flushed
    /// first if modified) and rebound.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - `Error::BlockNotFound`, `Error::Corrupted` or I/O errors from the read
    pub fn pin(&self, block: &BlockId) -> Result<Arc<Buffer>> {
        let mut state = self.state.lock();

        if let Some(buffer) = state.resident.get(block).cloned() {
            self.pin_resident(&mut state, &buffer);
            BufferPoolStats::bump(&self.stats.cache_hits);
            trace!(%block, pins = buffer.pin_count(), "pin hit");
            return Ok(buffer);
        }

        BufferPoolStats::bump(&self.stats.cache_misses);
        let buffer = match self.choose_unpinned_buffer(&mut state)? {
            Some(buffer) => buffer,
            None => return Err(self.exhausted(block)),
        };

        buffer.assign_to_block(block.clone(), &self.files)?;
        BufferPoolStats::bump(&self.stats.blocks_read);
        debug!(%block, "block read into pool");

        self.admit(&mut state, block.clone(), &buffer);
        Ok(buffer)
    }

    /// Append a new block to `file_name`, format it, and pin it.
    ///
    /// Always takes a frame (fresh or evicted); never reuses a binding.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - I/O errors from the append
    pub fn pin_new<F>(&self, file_name: &str, formatter: &F) -> Result<Arc<Buffer>>
    where
        F: PageFormatter + ?Sized,
    {
        let mut state = self.state.lock();

        let buffer = match self.choose_unpinned_buffer(&mut state)? {
            Some(buffer) => buffer,
            None => return Err(self.exhausted(&format_args!("new block of {}", file_name))),
        };

        let block = buffer.assign_to_new(file_name, formatter, &self.files)?;
        debug!(%block, "pinned new block");

        self.admit(&mut state, block, &buffer);
        Ok(buffer)
    }

    /// Release one pin on `buffer`.
    ///
    /// Each pin must be released exactly once. Once a caller's last pin is
    /// gone the frame may be evicted and rebound to another block, and a
    /// second `unpin` through the same `Arc` then releases a pin taken by
    /// someone else. Compare [`Buffer::block`] with the pinned block if in
    /// doubt, or use [`pin_guarded`](Self::pin_guarded), whose guard can
    /// release its pin only once.
    ///
    /// # Errors
    /// - `Error::Unbound` if the buffer holds no block
    /// - `Error::NotResident` if the buffer isn't a frame of this pool
    /// - `Error::NotPinned` if its pin count is already 0
    pub fn unpin(&self, buffer: &Buffer) -> Result<()> {
        let mut state = self.state.lock();

        let block = buffer.block().ok_or(Error::Unbound)?;
        match state.resident.get(&block) {
            Some(resident) if std::ptr::eq(Arc::as_ptr(resident), buffer) => {}
            _ => return Err(Error::NotResident(block)),
        }
        if !buffer.is_pinned() {
            return Err(Error::NotPinned(block));
        }

        let pins = buffer.unpin();
        let now = state.clock.tick();
        buffer.update_metadata(|m| state.replacer.on_unpin(m, now));
        trace!(%block, pins, "unpinned");
        Ok(())
    }

    /// Like [`pin`](Self::pin), but unpins automatically when the guard drops.
    pub fn pin_guarded(&self, block: &BlockId) -> Result<PinGuard<'_>> {
        Ok(PinGuard::new(self, self.pin(block)?))
    }

    /// Like [`pin_new`](Self::pin_new), but unpins automatically when the
    /// guard drops.
    pub fn pin_new_guarded<F>(&self, file_name: &str, formatter: &F) -> Result<PinGuard<'_>>
    where
        F: PageFormatter + ?Sized,
    {
        Ok(PinGuard::new(self, self.pin_new(file_name, formatter)?))
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Write every resident block modified by `txn` to disk.
    ///
    /// Blocks modified by other transactions are untouched, as are pin
    /// counts and policy metadata. Returns the number of blocks written.
    pub fn flush_all(&self, txn: TxnId) -> Result<usize> {
        let state = self.state.lock();

        let mut written = 0;
        for buffer in state.resident.values() {
            if buffer.is_modified_by(txn) && buffer.flush(&self.files)? {
                BufferPoolStats::bump(&self.stats.blocks_written);
                written += 1;
            }
        }

        debug!(%txn, written, "flushed transaction's blocks");
        Ok(written)
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Frames not yet bound to any block.
    ///
    /// Read without the pool lock; treat it as advisory.
    #[inline]
    pub fn available(&self) -> usize {
        self.available.load(Ordering::Acquire)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.config.policy
    }

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn files(&self) -> &Arc<FileManager> {
        &self.files
    }

    /// Number of bound frames.
    pub fn resident_count(&self) -> usize {
        self.state.lock().resident.len()
    }

    pub fn is_resident(&self, block: &BlockId) -> bool {
        self.state.lock().resident.contains_key(block)
    }

    /// Pin count of a resident block, or `None` if it isn't resident.
    pub fn pin_count(&self, block: &BlockId) -> Option<u32> {
        self.state.lock().resident.get(block).map(|b| b.pin_count())
    }

    /// Snapshot of every resident frame, sorted by block.
    pub fn frames(&self) -> Vec<FrameSnapshot> {
        Self::describe(&self.state.lock())
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Pin an already-bound frame and apply the policy's pin update.
    fn pin_resident(&self, state: &mut PoolState, buffer: &Buffer) {
        buffer.pin();
        let now = state.clock.tick();
        buffer.update_metadata(|m| state.replacer.on_pin(m, now));
    }

    /// Register a freshly bound frame, then pin it.
    fn admit(&self, state: &mut PoolState, block: BlockId, buffer: &Arc<Buffer>) {
        let now = state.clock.tick();
        buffer.set_metadata(state.replacer.on_bind(now));
        state.resident.insert(block, Arc::clone(buffer));
        self.publish_available(state);
        self.pin_resident(state, buffer);
    }

    /// Supply an unbound frame: a new one while capacity remains, otherwise
    /// the replacer's victim among unpinned frames, detached from the pool.
    ///
    /// Returns `Ok(None)` when every frame is pinned. A modified victim is
    /// flushed before it is detached, so a failed write leaves it resident.
    fn choose_unpinned_buffer(&self, state: &mut PoolState) -> Result<Option<Arc<Buffer>>> {
        if state.resident.len() < self.config.capacity {
            return Ok(Some(Arc::new(Buffer::new())));
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            let contents: Vec<String> = Self::describe(state).iter().map(|f| f.to_string()).collect();
            trace!(frames = ?contents, "pool full, searching for victim");
        }

        let started = Instant::now();
        let victim = {
            let candidates: Vec<Candidate<'_>> = state
                .resident
                .iter()
                .filter(|(_, buffer)| !buffer.is_pinned())
                .filter_map(|(block, buffer)| {
                    buffer.metadata().map(|metadata| Candidate { block, metadata })
                })
                .collect();

            state
                .replacer
                .select_victim(&candidates)
                .map(|idx| candidates[idx].block.clone())
        };
        trace!(elapsed_ns = started.elapsed().as_nanos() as u64, "victim search finished");

        let Some(victim) = victim else {
            return Ok(None);
        };
        let Some(buffer) = state.resident.get(&victim).cloned() else {
            return Ok(None);
        };

        if buffer.flush(&self.files)? {
            BufferPoolStats::bump(&self.stats.blocks_written);
        }
        state.resident.remove(&victim);
        self.publish_available(state);

        BufferPoolStats::bump(&self.stats.evictions);
        debug!(block = %victim, policy = %self.config.policy, "evicted");
        Ok(Some(buffer))
    }

    fn publish_available(&self, state: &PoolState) {
        let available = self.config.capacity.saturating_sub(state.resident.len());
        self.available.store(available, Ordering::Release);
    }

    fn exhausted(&self, wanted: &dyn fmt::Display) -> Error {
        BufferPoolStats::bump(&self.stats.pin_failures);
        warn!(%wanted, capacity = self.config.capacity, "no unpinned buffer available");
        Error::PoolExhausted {
            capacity: self.config.capacity,
        }
    }

    fn describe(state: &PoolState) -> Vec<FrameSnapshot> {
        let mut frames: Vec<FrameSnapshot> = state
            .resident
            .iter()
            .map(|(block, buffer)| FrameSnapshot {
                block: block.clone(),
                pin_count: buffer.pin_count(),
                modified_by: buffer.modifying_txn(),
                metadata: buffer.metadata(),
            })
            .collect();
        frames.sort_by(|a, b| a.block.cmp(&b.block));
        frames
    }
}

/// Point-in-time view of one resident frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub block: BlockId,
    pub pin_count: u32,
    pub modified_by: Option<TxnId>,
    pub metadata: Option<PolicyMetadata>,
}

impl fmt::Display for FrameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pins={}", self.block, self.pin_count)?;
        if let Some(txn) = self.modified_by {
            write!(f, " modified_by={}", txn)?;
        }
        if let Some(metadata) = self.metadata {
            write!(f, " {}", metadata)?;
        }
        Ok(())
    }
}
