//! Page header and type definitions.
//!
//! Every formatted page starts with a [`PageHeader`]:
//! - [`PageType`] discriminator
//! - CRC32 checksum, verified when the block is read back
//! - LSN of the last logged modification

use std::ops::Range;

/// Type of page stored on disk.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Unformatted page (never initialised by a formatter).
    #[default]
    Invalid = 0,
    /// Record page.
    Data = 1,
    /// Index block.
    Index = 2,
    /// Block released by its owner and awaiting reuse.
    Free = 3,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::Data,
            2 => PageType::Index,
            3 => PageType::Free,
            _ => PageType::Invalid,
        }
    }
}

/// Metadata stored at the beginning of every formatted page.
///
/// # Layout (13 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     page_type (PageType as u8)
/// 1       4     checksum (CRC32, little-endian)
/// 5       8     lsn (little-endian)
/// ```
///
/// The checksum covers the whole page with its own field read as zero.
/// A page whose type byte is [`PageType::Invalid`] carries no meaningful
/// checksum (e.g. a zero-filled block written by another tool) and is
/// never verified.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub checksum: u32,
    /// LSN stamped by the buffer at flush time; zero if never logged.
    pub lsn: u64,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 13;

    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 1;
    pub const OFFSET_LSN: usize = 5;

    const CHECKSUM: Range<usize> = Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4;
    const LSN: Range<usize> = Self::OFFSET_LSN..Self::OFFSET_LSN + 8;

    /// Create a new header with the given page type and zero checksum/LSN.
    pub fn new(page_type: PageType) -> Self {
        Self {
            page_type,
            checksum: 0,
            lsn: 0,
        }
    }

    /// Whether the page was initialised by a formatter.
    #[inline]
    pub fn is_formatted(&self) -> bool {
        self.page_type != PageType::Invalid
    }

    /// Decode a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&data[Self::CHECKSUM]);
        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&data[Self::LSN]);

        Self {
            page_type: PageType::from_u8(data[Self::OFFSET_PAGE_TYPE]),
            checksum: u32::from_le_bytes(checksum),
            lsn: u64::from_le_bytes(lsn),
        }
    }

    /// Encode this header into the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        data[Self::CHECKSUM].copy_from_slice(&self.checksum.to_le_bytes());
        data[Self::LSN].copy_from_slice(&self.lsn.to_le_bytes());
    }

    /// CRC32 of a full page, reading the checksum field as zeros.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::CHECKSUM.end..]);
        hasher.finalize()
    }

    /// Whether the stored checksum matches `page_data`.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}
