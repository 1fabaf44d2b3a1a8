//! Page formatters - initial contents for freshly appended blocks.

use crate::storage::page::{Page, PageType};

/// Fills an empty page with its initial contents.
///
/// Used by [`BufferManager::pin_new`](crate::buffer::BufferManager::pin_new):
/// the buffer hands the formatter a zeroed page, then appends the result
/// as a new block.
///
/// Closures taking `&mut Page` implement this trait:
/// ```
/// use blockbuf::storage::page::{Page, PageType};
/// use blockbuf::storage::PageFormatter;
///
/// let fmt = |page: &mut Page| {
///     page.format(PageType::Data);
///     page.payload_mut()[0] = 1;
/// };
/// let mut page = Page::new();
/// fmt.format(&mut page);
/// assert_eq!(page.payload()[0], 1);
/// ```
pub trait PageFormatter {
    fn format(&self, page: &mut Page);
}

impl<F> PageFormatter for F
where
    F: Fn(&mut Page),
{
    fn format(&self, page: &mut Page) {
        self(page)
    }
}

/// Formatter that writes an empty header of a fixed [`PageType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedPageFormatter(pub PageType);

impl PageFormatter for TypedPageFormatter {
    fn format(&self, page: &mut Page) {
        page.format(self.0);
    }
}
