//! File Manager - block I/O across the files of one database directory.
//!
//! The [`FileManager`] is the persistence primitive beneath the buffer
//! pool:
//! - Reading a block into a page
//! - Writing a page back to its block
//! - Appending a new block to a file

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{BlockId, Error, Result};
use crate::storage::page::Page;

/// Manages block I/O for every file in a database directory.
///
/// # File Layout
/// Each file is a sequence of fixed-size blocks:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │  ...    │ Block N │
/// │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096    ...    N×4096
/// ```
///
/// Files are created on first use and their handles are cached.
///
/// # Thread Safety
/// All methods take `&self`; handles live behind one mutex, so I/O is
/// serialised. Share the manager between pools and callers with `Arc`.
///
/// # Durability
/// Writes and appends are followed by `fsync()`.
pub struct FileManager {
    directory: PathBuf,
    open_files: Mutex<HashMap<String, File>>,
}

impl FileManager {
    /// Open a database directory, creating it if it doesn't exist.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;

        Ok(Self {
            directory,
            open_files: Mutex::new(HashMap::new()),
        })
    }

    /// The directory holding the database files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Read a block into `page`.
    ///
    /// # Errors
    /// Returns `Error::BlockNotFound` if the block lies beyond the end of
    /// its file.
    pub fn read(&self, block: &BlockId, page: &mut Page) -> Result<()> {
        let mut files = self.open_files.lock();
        let file = Self::file_handle(&self.directory, &mut files, block.file_name())?;

        if block.number() >= Self::count_blocks(file)? {
            return Err(Error::BlockNotFound(block.clone()));
        }

        file.seek(SeekFrom::Start(Self::offset(block.number())))?;
        file.read_exact(page.as_mut_slice())?;
        Ok(())
    }

    /// Write `page` to an existing block.
    ///
    /// # Errors
    /// Returns `Error::BlockNotFound` if the block hasn't been appended yet.
    pub fn write(&self, block: &BlockId, page: &Page) -> Result<()> {
        let mut files = self.open_files.lock();
        let file = Self::file_handle(&self.directory, &mut files, block.file_name())?;

        if block.number() >= Self::count_blocks(file)? {
            return Err(Error::BlockNotFound(block.clone()));
        }

        file.seek(SeekFrom::Start(Self::offset(block.number())))?;
        file.write_all(page.as_slice())?;
        file.sync_all()?;
        Ok(())
    }

    /// Append `page` as a new block at the end of `file_name`.
    ///
    /// Returns the identifier of the new block.
    pub fn append(&self, file_name: &str, page: &Page) -> Result<BlockId> {
        let mut files = self.open_files.lock();
        let file = Self::file_handle(&self.directory, &mut files, file_name)?;

        let number = Self::count_blocks(file)?;
        file.seek(SeekFrom::Start(Self::offset(number)))?;
        file.write_all(page.as_slice())?;
        file.sync_all()?;

        Ok(BlockId::new(file_name, number))
    }

    /// Number of blocks currently in `file_name` (0 for a new file).
    pub fn block_count(&self, file_name: &str) -> Result<u32> {
        let mut files = self.open_files.lock();
        let file = Self::file_handle(&self.directory, &mut files, file_name)?;
        Self::count_blocks(file)
    }

    fn file_handle<'a>(
        directory: &Path,
        files: &'a mut HashMap<String, File>,
        file_name: &str,
    ) -> Result<&'a mut File> {
        match files.entry(file_name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(directory.join(file_name))?;
                Ok(entry.insert(file))
            }
        }
    }

    fn count_blocks(file: &File) -> Result<u32> {
        Self::blocks_in(file.metadata()?.len())
    }

    /// Whole blocks in a file of `len` bytes; block numbers are `u32`.
    fn blocks_in(len: u64) -> Result<u32> {
        u32::try_from(len / PAGE_SIZE as u64).map_err(|_| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file of {} bytes exceeds the u32 block number range", len),
            ))
        })
    }

    #[inline]
    fn offset(number: u32) -> u64 {
        (number as u64) * (PAGE_SIZE as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::page::PageType;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db");

        let fm = FileManager::open(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(fm.directory(), path.as_path());
    }

    #[test]
    fn test_new_file_is_empty() {
        let dir = tempdir().unwrap();
        let fm = FileManager::open(dir.path()).unwrap();

        assert_eq!(fm.block_count("fresh.tbl").unwrap(), 0);
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempdir().unwrap();
        let fm = FileManager::open(dir.path()).unwrap();

        let mut page = Page::new();
        page.format(PageType::Data);
        page.payload_mut()[0] = 0xAB;

        let blk0 = fm.append("t.tbl", &page).unwrap();
        let blk1 = fm.append("t.tbl", &Page::new()).unwrap();
        assert_eq!(blk0, BlockId::new("t.tbl", 0));
        assert_eq!(blk1, BlockId::new("t.tbl", 1));
        assert_eq!(fm.block_count("t.tbl").unwrap(), 2);

        let mut read_back = Page::new();
        fm.read(&blk0, &mut read_back).unwrap();
        assert_eq!(read_back.payload()[0], 0xAB);
        assert_eq!(read_back.header().page_type, PageType::Data);
    }

    #[test]
    fn test_write_overwrites_block() {
        let dir = tempdir().unwrap();
        let fm = FileManager::open(dir.path()).unwrap();
        let blk = fm.append("t.tbl", &Page::new()).unwrap();

        let mut page = Page::new();
        page.payload_mut()[100] = 0xCD;
        fm.write(&blk, &page).unwrap();

        let mut read_back = Page::new();
        fm.read(&blk, &mut read_back).unwrap();
        assert_eq!(read_back.payload()[100], 0xCD);
    }

    #[test]
    fn test_files_are_independent() {
        let dir = tempdir().unwrap();
        let fm = FileManager::open(dir.path()).unwrap();

        fm.append("a.tbl", &Page::new()).unwrap();
        fm.append("a.tbl", &Page::new()).unwrap();
        let blk = fm.append("b.tbl", &Page::new()).unwrap();

        assert_eq!(blk.number(), 0);
        assert_eq!(fm.block_count("a.tbl").unwrap(), 2);
        assert_eq!(fm.block_count("b.tbl").unwrap(), 1);
    }

    #[test]
    fn test_read_and_write_past_end_fail() {
        let dir = tempdir().unwrap();
        let fm = FileManager::open(dir.path()).unwrap();
        fm.append("t.tbl", &Page::new()).unwrap();

        let missing = BlockId::new("t.tbl", 1);
        let mut page = Page::new();
        assert!(matches!(fm.read(&missing, &mut page), Err(Error::BlockNotFound(_))));
        assert!(matches!(fm.write(&missing, &page), Err(Error::BlockNotFound(_))));
    }

    #[test]
    fn test_persistence_across_managers() {
        let dir = tempdir().unwrap();

        let blk = {
            let fm = FileManager::open(dir.path()).unwrap();
            let mut page = Page::new();
            page.payload_mut()[0] = 0x42;
            fm.append("t.tbl", &page).unwrap()
        };

        let fm = FileManager::open(dir.path()).unwrap();
        assert_eq!(fm.block_count("t.tbl").unwrap(), 1);
        let mut page = Page::new();
        fm.read(&blk, &mut page).unwrap();
        assert_eq!(page.payload()[0], 0x42);
    }

    #[test]
    fn test_block_count_rejects_oversized_file() {
        let page = PAGE_SIZE as u64;
        assert_eq!(FileManager::blocks_in(0).unwrap(), 0);
        assert_eq!(FileManager::blocks_in(3 * page + 17).unwrap(), 3);
        assert_eq!(FileManager::blocks_in(u32::MAX as u64 * page).unwrap(), u32::MAX);
        assert!(matches!(FileManager::blocks_in((u32::MAX as u64 + 1) * page), Err(Error::Io(_))));
    }
}
