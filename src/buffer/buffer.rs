//! Buffer - one frame of the buffer pool.
//!
//! A [`Buffer`] holds a [`Page`] plus the metadata needed for buffer
//! management:
//! - Which block is bound (if any)
//! - Pin count
//! - Which transaction last modified the page, and the log record's LSN
//! - Eviction-policy metadata

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::replacer::PolicyMetadata;
use crate::common::{BlockId, Error, Lsn, Result, TxnId};
use crate::storage::page::Page;
use crate::storage::{FileManager, PageFormatter};

#[derive(Debug, Default, Clone, Copy)]
struct Modification {
    txn: Option<TxnId>,
    lsn: Option<Lsn>,
}

/// A frame in the buffer pool.
///
/// Buffers are created lazily by the pool and handed to callers as
/// `Arc<Buffer>` when pinned. After eviction the same buffer is rebound to
/// another block, so a caller must not use a buffer after unpinning it.
///
/// # Thread Safety
/// All fields use interior mutability:
/// - `contents`: `RwLock` so pinning callers can read and write the page
/// - `block`, `modification`, `metadata`: `Mutex`
/// - `pin_count`: `AtomicU32`
///
/// Binding, pin-count and metadata changes are made by the pool under its
/// own lock. Do not hold a `contents_mut()` guard while calling into the
/// pool from the same thread: flushing takes the page lock.
///
/// Calling [`set_modified`](Self::set_modified) while holding a
/// `contents_mut()` guard is fine. Whenever both locks are needed, the page
/// lock is taken before the modification lock.
pub struct Buffer {
    contents: RwLock<Page>,
    block: Mutex<Option<BlockId>>,
    pin_count: AtomicU32,
    modification: Mutex<Modification>,
    metadata: Mutex<Option<PolicyMetadata>>,
}

impl Buffer {
    /// Create a new unbound buffer.
    pub fn new() -> Self {
        Self {
            contents: RwLock::new(Page::new()),
            block: Mutex::new(None),
            pin_count: AtomicU32::new(0),
            modification: Mutex::new(Modification::default()),
            metadata: Mutex::new(None),
        }
    }

    // ========================================================================
    // Page access
    // ========================================================================

    /// Acquire read lock on the page.
    #[inline]
    pub fn contents(&self) -> RwLockReadGuard<'_, Page> {
        self.contents.read()
    }

    /// Acquire write lock on the page.
    ///
    /// Writing does not mark the buffer modified; call
    /// [`set_modified`](Self::set_modified) once the change is logged.
    #[inline]
    pub fn contents_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.contents.write()
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// The block currently bound to this buffer.
    #[inline]
    pub fn block(&self) -> Option<BlockId> {
        self.block.lock().clone()
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.block.lock().is_some()
    }

    /// Bind this buffer to an existing block and read its contents.
    ///
    /// Flushes the previous block first if it was modified. On a read
    /// failure the buffer is left unbound.
    ///
    /// # Errors
    /// - I/O errors from the flush or the read
    /// - `Error::BlockNotFound` if the block doesn't exist
    /// - `Error::Corrupted` if the block fails checksum verification
    pub fn assign_to_block(&self, block: BlockId, files: &FileManager) -> Result<()> {
        self.flush(files)?;
        self.unbind();

        {
            let mut page = self.contents.write();
            files.read(&block, &mut page)?;
            if !page.verify_checksum() {
                return Err(Error::Corrupted(block));
            }
        }

        *self.block.lock() = Some(block);
        Ok(())
    }

    /// Append a new block to `file_name`, formatted by `formatter`, and bind
    /// this buffer to it.
    ///
    /// Flushes the previous block first if it was modified. Grows the file
    /// by one block.
    pub fn assign_to_new<F>(&self, file_name: &str, formatter: &F, files: &FileManager) -> Result<BlockId>
    where
        F: PageFormatter + ?Sized,
    {
        self.flush(files)?;
        self.unbind();

        let block = {
            let mut page = self.contents.write();
            page.reset();
            formatter.format(&mut page);
            if page.header().is_formatted() {
                page.update_checksum();
            }
            files.append(file_name, &page)?
        };

        *self.block.lock() = Some(block.clone());
        Ok(block)
    }

    fn unbind(&self) {
        *self.block.lock() = None;
        *self.metadata.lock() = None;
        *self.modification.lock() = Modification::default();
        self.pin_count.store(0, Ordering::Relaxed);
    }

    // ========================================================================
    // Pin count operations (Atomic)
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub(crate) fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub(crate) fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Relaxed);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Modification tracking
    // ========================================================================

    /// Record that `txn` changed the page.
    ///
    /// `lsn` is the log record describing the change, if one was written.
    /// A later call without an LSN keeps the previous one.
    pub fn set_modified(&self, txn: TxnId, lsn: Option<Lsn>) {
        let mut modification = self.modification.lock();
        modification.txn = Some(txn);
        if lsn.is_some() {
            modification.lsn = lsn;
        }
    }

    /// The transaction with unflushed changes, if any.
    #[inline]
    pub fn modifying_txn(&self) -> Option<TxnId> {
        self.modification.lock().txn
    }

    #[inline]
    pub fn is_modified_by(&self, txn: TxnId) -> bool {
        self.modifying_txn() == Some(txn)
    }

    /// LSN of the last logged modification.
    #[inline]
    pub fn lsn(&self) -> Option<Lsn> {
        self.modification.lock().lsn
    }

    /// Write the page to its block if it has unflushed changes.
    ///
    /// Formatted pages get the LSN stamped and the checksum refreshed first.
    /// Returns whether anything was written.
    pub fn flush(&self, files: &FileManager) -> Result<bool> {
        // Lock order: contents, then modification. Writers hold contents
        // while calling set_modified.
        let mut page = self.contents.write();
        let mut modification = self.modification.lock();
        if modification.txn.is_none() {
            return Ok(false);
        }

        let block = self.block().ok_or(Error::Unbound)?;
        if page.header().is_formatted() {
            if let Some(lsn) = modification.lsn {
                page.set_lsn(lsn.0);
            }
            page.update_checksum();
        }
        files.write(&block, &page)?;

        modification.txn = None;
        Ok(true)
    }

    // ========================================================================
    // Policy metadata
    // ========================================================================

    /// Eviction-policy metadata; `None` while unbound.
    #[inline]
    pub fn metadata(&self) -> Option<PolicyMetadata> {
        *self.metadata.lock()
    }

    pub(crate) fn set_metadata(&self, metadata: PolicyMetadata) {
        *self.metadata.lock() = Some(metadata);
    }

    pub(crate) fn update_metadata<F>(&self, update: F)
    where
        F: FnOnce(&mut PolicyMetadata),
    {
        if let Some(metadata) = self.metadata.lock().as_mut() {
            update(metadata);
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::clock::Tick;
    use crate::storage::page::PageType;
    use crate::storage::TypedPageFormatter;
    use tempfile::tempdir;

    fn files() -> (FileManager, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        (FileManager::open(dir.path()).unwrap(), dir)
    }

    #[test]
    fn test_buffer_new() {
        let buffer = Buffer::new();
        assert!(!buffer.is_bound());
        assert!(!buffer.is_pinned());
        assert_eq!(buffer.block(), None);
        assert_eq!(buffer.modifying_txn(), None);
        assert_eq!(buffer.metadata(), None);
    }

    #[test]
    fn test_buffer_pin_unpin() {
        let buffer = Buffer::new();

        assert_eq!(buffer.pin(), 1);
        assert_eq!(buffer.pin(), 2);
        assert_eq!(buffer.unpin(), 1);
        assert!(buffer.is_pinned());
        assert_eq!(buffer.unpin(), 0);
        assert!(!buffer.is_pinned());
    }

    #[test]
    #[should_panic(expected = "pin count underflow")]
    fn test_buffer_unpin_underflow() {
        Buffer::new().unpin();
    }

    #[test]
    fn test_assign_to_new_appends_formatted_block() {
        let (fm, _dir) = files();
        let buffer = Buffer::new();

        let block = buffer
            .assign_to_new("t.tbl", &TypedPageFormatter(PageType::Data), &fm)
            .unwrap();

        assert_eq!(block, BlockId::new("t.tbl", 0));
        assert_eq!(buffer.block(), Some(block));
        assert_eq!(buffer.pin_count(), 0);
        assert_eq!(fm.block_count("t.tbl").unwrap(), 1);
        assert!(buffer.contents().verify_checksum());
    }

    #[test]
    fn test_flush_only_when_modified() {
        let (fm, _dir) = files();
        let buffer = Buffer::new();
        buffer
            .assign_to_new("t.tbl", &TypedPageFormatter(PageType::Data), &fm)
            .unwrap();

        assert!(!buffer.flush(&fm).unwrap());

        buffer.contents_mut().payload_mut()[0] = 0x99;
        buffer.set_modified(TxnId::new(1), Some(Lsn(17)));
        assert!(buffer.is_modified_by(TxnId::new(1)));
        assert!(!buffer.is_modified_by(TxnId::new(2)));

        assert!(buffer.flush(&fm).unwrap());
        assert_eq!(buffer.modifying_txn(), None);
        assert!(!buffer.flush(&fm).unwrap());

        let mut page = Page::new();
        fm.read(&BlockId::new("t.tbl", 0), &mut page).unwrap();
        assert_eq!(page.payload()[0], 0x99);
        assert_eq!(page.header().lsn, 17);
        assert!(page.verify_checksum());
    }

    #[test]
    fn test_set_modified_keeps_previous_lsn() {
        let buffer = Buffer::new();
        buffer.set_modified(TxnId::new(1), Some(Lsn(5)));
        buffer.set_modified(TxnId::new(2), None);

        assert_eq!(buffer.modifying_txn(), Some(TxnId::new(2)));
        assert_eq!(buffer.lsn(), Some(Lsn(5)));
    }

    #[test]
    fn test_assign_to_block_flushes_previous() {
        let (fm, _dir) = files();
        let fmt = TypedPageFormatter(PageType::Data);
        let other_block = Buffer::new().assign_to_new("t.tbl", &fmt, &fm).unwrap();

        let buffer = Buffer::new();
        let own_block = buffer.assign_to_new("t.tbl", &fmt, &fm).unwrap();
        buffer.contents_mut().payload_mut()[1] = 0x42;
        buffer.set_modified(TxnId::new(3), None);

        buffer.assign_to_block(other_block.clone(), &fm).unwrap();
        assert_eq!(buffer.block(), Some(other_block));
        assert_eq!(buffer.modifying_txn(), None);

        buffer.assign_to_block(own_block, &fm).unwrap();
        assert_eq!(buffer.contents().payload()[1], 0x42);
    }

    #[test]
    fn test_assign_to_missing_block_leaves_unbound() {
        let (fm, _dir) = files();
        let buffer = Buffer::new();

        let result = buffer.assign_to_block(BlockId::new("t.tbl", 4), &fm);
        assert!(matches!(result, Err(Error::BlockNotFound(_))));
        assert!(!buffer.is_bound());
    }

    #[test]
    fn test_assign_detects_corruption() {
        let (fm, _dir) = files();
        let mut page = Page::new();
        page.format(PageType::Data);
        page.update_checksum();
        page.payload_mut()[0] = 0xFF;
        let block = fm.append("t.tbl", &page).unwrap();

        let buffer = Buffer::new();
        let result = buffer.assign_to_block(block, &fm);
        assert!(matches!(result, Err(Error::Corrupted(_))));
    }

    #[test]
    fn test_metadata_update_requires_binding() {
        let buffer = Buffer::new();
        buffer.update_metadata(|_| panic!("unbound buffer has no metadata"));

        buffer.set_metadata(PolicyMetadata::Mru { last_touched: Tick(1) });
        buffer.update_metadata(|m| *m = PolicyMetadata::Mru { last_touched: Tick(2) });
        assert_eq!(buffer.metadata(), Some(PolicyMetadata::Mru { last_touched: Tick(2) }));
    }
}
