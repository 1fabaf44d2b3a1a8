//! Page - the in-memory image of one block.
//!
//! A [`Page`] is a 4KB byte array: a [`PageHeader`] followed by the
//! payload owned by whichever layer formatted the block.

use crate::common::config::PAGE_SIZE;

use super::page_header::{PageHeader, PageType};

/// A page of data (4KB, 4KB-aligned).
///
/// `Page` does NOT implement `Clone` outside tests; copying 4KB should be
/// explicit (see [`Page::copy_from`]).
///
/// # Example
/// ```
/// use blockbuf::storage::page::{Page, PageType};
///
/// let mut page = Page::new();
/// page.format(PageType::Data);
/// page.payload_mut()[0] = 0xFF;
/// assert_eq!(page.payload()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed (unformatted) page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes after the header.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[PageHeader::SIZE..]
    }

    /// Mutable bytes after the header.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.data[PageHeader::SIZE..]
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Overwrite this page with the contents of `other`.
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Reset the page and write a fresh header of the given type.
    pub fn format(&mut self, page_type: PageType) {
        self.reset();
        self.set_header(&PageHeader::new(page_type));
    }

    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    pub fn header(&self) -> PageHeader {
        PageHeader::from_bytes(&self.data)
    }

    pub fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.data);
    }

    /// Stamp the LSN field, leaving type and checksum untouched.
    pub fn set_lsn(&mut self, lsn: u64) {
        let mut header = self.header();
        header.lsn = lsn;
        self.set_header(&header);
    }

    /// Compute and store the checksum. Call after the last modification.
    pub fn update_checksum(&mut self) {
        let checksum = PageHeader::compute_checksum(&self.data);
        self.data[PageHeader::OFFSET_CHECKSUM..PageHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Whether the page is intact.
    ///
    /// Unformatted pages have nothing to verify and always pass.
    pub fn verify_checksum(&self) -> bool {
        let header = self.header();
        !header.is_formatted() || header.verify_checksum(&self.data)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.copy_from(self);
        new_page
    }
}
