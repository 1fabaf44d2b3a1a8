//! blockbuf - the buffer layer of a small relational database.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Record / log layers (callers)                      │
//! │        pin → read/modify contents → set_modified → unpin        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │       Buffer Manager (buffer/)  [policy per pool]       │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │      Eviction Policies: FIFO | LFU | MRU        │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │      BufferManager + Buffer + PinGuard + Statistics     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     FileManager + Page + PageHeader + PageFormatter      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, TxnId, Error, config)
//! - [`buffer`] - Buffer management and eviction policies
//! - [`storage`] - Block I/O and page formats
//!
//! # Quick Start
//! ```no_run
//! # fn main() -> blockbuf::Result<()> {
//! use std::sync::Arc;
//! use blockbuf::{BufferManager, BufferPoolConfig, TxnId};
//! use blockbuf::storage::page::PageType;
//! use blockbuf::storage::{FileManager, TypedPageFormatter};
//!
//! let files = Arc::new(FileManager::open("dbdir")?);
//! let bm = BufferManager::new(BufferPoolConfig::from_env()?, files)?;
//!
//! let guard = bm.pin_new_guarded("accounts.tbl", &TypedPageFormatter(PageType::Data))?;
//! guard.contents_mut().payload_mut()[..5].copy_from_slice(b"hello");
//! guard.set_modified(TxnId::new(1), None);
//! drop(guard);
//!
//! bm.flush_all(TxnId::new(1))?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BlockId, BufferPoolConfig, Error, EvictionPolicy, Lsn, Result, TxnId};

pub use buffer::{Buffer, BufferManager, BufferPoolStats, FrameSnapshot, PinGuard, StatsSnapshot};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::{FileManager, PageFormatter, TypedPageFormatter};
