//! The cache contract consumed by the generator and the worker pool.
//!
//! A `Memoizer` maps ordinals to Fibonacci values. Implementations must be
//! safe to share between threads: the pool hands one instance to every
//! worker and adds no locking of its own.

use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::number::Number;

/// Key-value store of previously computed Fibonacci values.
///
/// - `read` returns `Ok(None)` on a miss. A miss is a normal outcome.
/// - `write` is an upsert. Writing the same value twice leaves the cache
///   unchanged; concurrent writers of one ordinal race and the last one wins.
/// - `clear` removes every entry and may be called while other threads are
///   reading or writing.
pub trait Memoizer: Send + Sync {
    /// Look up the value stored for `ordinal`.
    fn read(&self, ordinal: u64) -> Result<Option<Number>, CacheError>;

    /// Store or replace the value for `ordinal`.
    fn write(&self, ordinal: u64, value: &Number) -> Result<(), CacheError>;

    /// Remove all entries.
    fn clear(&self) -> Result<(), CacheError>;

    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &str;
}

/// A persisted (ordinal, value) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The Fibonacci ordinal N.
    pub ordinal: u64,
    /// F(N), stored as a decimal string.
    pub value: Number,
}

impl CacheEntry {
    #[must_use]
    pub fn new(ordinal: u64, value: Number) -> Self {
        Self { ordinal, value }
    }
}

/// Null object backend: every read misses and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl NullCache {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Memoizer for NullCache {
    fn read(&self, _ordinal: u64) -> Result<Option<Number>, CacheError> {
        Ok(None)
    }

    fn write(&self, _ordinal: u64, _value: &Number) -> Result<(), CacheError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
