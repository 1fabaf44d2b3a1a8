//! Buffer management.
//!
//! The buffer manager is the in-memory cache layer between the record and
//! log layers and disk. It owns a capacity-bounded set of buffers, each
//! holding one block's page while it is resident.
//!
//! # Components
//! - [`BufferManager`] - Pins, unpins and flushes blocks
//! - [`Buffer`] - A frame holding a page plus pin and modification state
//! - [`PinGuard`] - RAII guard that unpins on drop
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Eviction policy implementations

#[allow(clippy::module_inception)]
mod buffer;
mod buffer_manager;
mod clock;
mod pin_guard;
pub mod replacer;
mod stats;

pub use buffer::Buffer;
pub use buffer_manager::{BufferManager, FrameSnapshot};
pub use clock::Tick;
pub use pin_guard::PinGuard;
pub use stats::{BufferPoolStats, StatsSnapshot};
