//! Configuration for blockbuf.
//!
//! Holds the page-size constant and the buffer pool's construction
//! parameters: capacity and eviction policy.

use std::fmt;
use std::str::FromStr;

use super::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Every block on disk and every frame in memory is exactly this size.
pub const PAGE_SIZE: usize = 4096;

/// Environment variable naming the eviction policy (`fifo`, `lfu`, `mru`).
pub const POLICY_ENV: &str = "BLOCKBUF_POLICY";

/// Environment variable holding the pool capacity in frames.
pub const CAPACITY_ENV: &str = "BLOCKBUF_CAPACITY";

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 8;

/// Victim-selection policy of a buffer pool.
///
/// Exactly one policy is active per pool instance, fixed at construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionPolicy {
    /// Evict the frame that was bound earliest.
    #[default]
    Fifo,
    /// Evict the frame with the fewest pin/unpin events.
    Lfu,
    /// Evict the most recently touched frame.
    Mru,
}

impl EvictionPolicy {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::Fifo => "fifo",
            EvictionPolicy::Lfu => "lfu",
            EvictionPolicy::Mru => "mru",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::Fifo),
            "lfu" => Ok(EvictionPolicy::Lfu),
            "mru" => Ok(EvictionPolicy::Mru),
            other => Err(Error::InvalidConfig(format!(
                "unknown eviction policy '{}'",
                other
            ))),
        }
    }
}

/// Construction parameters of a [`BufferManager`](crate::buffer::BufferManager).
///
/// # Example
/// ```
/// use blockbuf::{BufferPoolConfig, EvictionPolicy};
///
/// let config = BufferPoolConfig::new(16, EvictionPolicy::Lfu);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Maximum number of bound frames. Fixed for the pool's lifetime.
    pub capacity: usize,
    /// Victim-selection policy.
    pub policy: EvictionPolicy,
}

impl BufferPoolConfig {
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self { capacity, policy }
    }

    /// Build a config from `BLOCKBUF_CAPACITY` and `BLOCKBUF_POLICY`.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capacity = match lookup(CAPACITY_ENV) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::InvalidConfig(format!("{} must be a positive integer, got '{}'", CAPACITY_ENV, raw))
            })?,
            None => DEFAULT_CAPACITY,
        };

        let policy = match lookup(POLICY_ENV) {
            Some(raw) => raw.parse()?,
            None => EvictionPolicy::default(),
        };

        let config = Self { capacity, policy };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, EvictionPolicy::default())
    }
}
