//! Block identifier type.

use std::fmt;

/// Identifies one fixed-size block on disk: a file name plus the block's
/// position within that file.
///
/// Equality and hashing are structural, so a `BlockId` is used directly as
/// the buffer pool's lookup key.
///
/// # Example
/// ```
/// use blockbuf::BlockId;
///
/// let blk = BlockId::new("students.tbl", 3);
/// assert_eq!(blk.file_name(), "students.tbl");
/// assert_eq!(blk.number(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    file_name: String,
    number: u32,
}

impl BlockId {
    /// Create a new BlockId.
    pub fn new(file_name: impl Into<String>, number: u32) -> Self {
        Self {
            file_name: file_name.into(),
            number,
        }
    }

    /// Name of the file holding this block.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Position of the block within its file.
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[file {}, block {}]", self.file_name, self.number)
    }
}
