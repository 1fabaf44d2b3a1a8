//! Error types for blockbuf.

use super::BlockId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the buffer manager and its collaborators.
///
/// Pool exhaustion is the only failure a well-behaved caller should expect
/// to handle routinely. `NotPinned`, `NotResident` and `Unbound` indicate a
/// caller bug and are reported instead of silently corrupting pool state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from the file manager, passed through unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested block lies beyond the end of its file.
    #[error("Block {0} not found")]
    BlockNotFound(BlockId),

    /// Stored checksum does not match the block contents.
    #[error("Block {0} failed checksum verification")]
    Corrupted(BlockId),

    /// Every frame is bound and pinned, so no victim exists.
    #[error("No buffer available: all {capacity} frames are pinned")]
    PoolExhausted { capacity: usize },

    /// Attempted to unpin a buffer whose pin count is already zero.
    #[error("Block {0} is not pinned")]
    NotPinned(BlockId),

    /// The buffer is not a resident frame of this pool.
    #[error("Block {0} is not resident in the buffer pool")]
    NotResident(BlockId),

    /// The buffer is not bound to any block.
    #[error("Buffer is not bound to a block")]
    Unbound,

    /// Configuration rejected at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
