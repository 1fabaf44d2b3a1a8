//! RAII guard for a pinned buffer.
//!
//! A [`PinGuard`] holds one pin on a buffer and releases it when dropped,
//! so an early `?` return can't leak a pin and exhaust the pool.

use std::ops::Deref;
use std::sync::Arc;

use tracing::warn;

use crate::common::{BlockId, Result};

use super::buffer_manager::BufferManager;
use super::Buffer;

/// One pin on a buffer, released on drop.
///
/// Derefs to [`Buffer`], so page access goes through
/// [`contents`](Buffer::contents) and [`contents_mut`](Buffer::contents_mut)
/// as usual.
///
/// # Example
/// ```no_run
/// # fn main() -> blockbuf::Result<()> {
/// use std::sync::Arc;
/// use blockbuf::{BlockId, BufferManager, BufferPoolConfig};
/// use blockbuf::storage::FileManager;
///
/// let files = Arc::new(FileManager::open("dbdir")?);
/// let bm = BufferManager::new(BufferPoolConfig::default(), files)?;
/// let block = BlockId::new("students.tbl", 0);
///
/// {
///     let guard = bm.pin_guarded(&block)?;
///     let _first = guard.contents().payload()[0];
///     // guard drops here, buffer unpinned
/// }
/// assert_eq!(bm.pin_count(&block), Some(0));
/// # Ok(())
/// # }
/// ```
pub struct PinGuard<'a> {
    /// Reference back to the manager for unpin on drop.
    bm: &'a BufferManager,
    buffer: Arc<Buffer>,
    /// Cleared once the pin has been released explicitly.
    pinned: bool,
}

impl<'a> PinGuard<'a> {
    /// Wrap a buffer that `bm` has just pinned.
    pub(crate) fn new(bm: &'a BufferManager, buffer: Arc<Buffer>) -> Self {
        Self {
            bm,
            buffer,
            pinned: true,
        }
    }

    /// The block this guard keeps resident.
    #[inline]
    pub fn block_id(&self) -> Option<BlockId> {
        self.buffer.block()
    }

    /// The pinned buffer itself.
    #[inline]
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Release the pin now and report any error instead of logging it.
    pub fn unpin(mut self) -> Result<()> {
        self.pinned = false;
        self.bm.unpin(&self.buffer)
    }
}

impl Deref for PinGuard<'_> {
    type Target = Buffer;

    #[inline]
    fn deref(&self) -> &Buffer {
        &self.buffer
    }
}

impl Drop for PinGuard<'_> {
    fn drop(&mut self) {
        if !self.pinned {
            return;
        }
        if let Err(err) = self.bm.unpin(&self.buffer) {
            warn!(error = %err, "failed to unpin guarded buffer");
        }
    }
}
