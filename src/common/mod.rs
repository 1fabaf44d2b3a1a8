//! Common types and utilities shared across blockbuf.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration (page size, pool capacity, eviction policy)
//! - Error types
//! - Identifiers (BlockId, TxnId, Lsn)

mod block_id;
pub mod config;
pub mod error;
mod txn;

pub use block_id::BlockId;
pub use config::{BufferPoolConfig, EvictionPolicy};
pub use error::{Error, Result};
pub use txn::{Lsn, TxnId};
