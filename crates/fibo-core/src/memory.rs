//! In-memory cache backend.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::cache::Memoizer;
use crate::error::CacheError;
use crate::number::Number;

/// A hash table behind a single mutex.
///
/// Every operation takes the lock for its whole duration, so a reader never
/// observes a partially written entry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    table: Mutex<HashMap<u64, Number>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated with `values`.
    #[must_use]
    pub fn with_values(values: HashMap<u64, Number>) -> Self {
        Self {
            table: Mutex::new(values),
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    /// Sorted list of the ordinals currently stored.
    #[must_use]
    pub fn ordinals(&self) -> Vec<u64> {
        let mut keys: Vec<u64> = self.table.lock().keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl Memoizer for MemoryCache {
    fn read(&self, ordinal: u64) -> Result<Option<Number>, CacheError> {
        Ok(self.table.lock().get(&ordinal).cloned())
    }

    fn write(&self, ordinal: u64, value: &Number) -> Result<(), CacheError> {
        self.table.lock().insert(ordinal, value.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.table.lock().clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
