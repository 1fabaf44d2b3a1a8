//! Storage layer - block I/O and page formats.
//!
//! This module handles persistent storage:
//! - [`FileManager`] - Block reads, writes and appends
//! - [`PageFormatter`] - Initial contents of new blocks
//! - [`page`] - Page types and layouts

mod file_manager;
mod formatter;
pub mod page;

pub use file_manager::FileManager;
pub use formatter::{PageFormatter, TypedPageFormatter};
