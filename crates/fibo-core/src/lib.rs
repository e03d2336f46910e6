//! # fibo-core
//!
//! Core library for the fibo memoizing Fibonacci service: the `Number`
//! model, the `Memoizer` cache contract with in-memory backends, the
//! memoized `Generator` and the range counter.

pub mod cache;
pub mod constants;
pub mod error;
pub mod generator;
pub mod memory;
pub mod number;
pub mod observer;
pub mod observers;
pub mod range;

// Re-exports
pub use cache::{CacheEntry, Memoizer, NullCache};
pub use constants::{exit_codes, DEFAULT_WORKERS, QUEUE_SLOTS_PER_WORKER};
pub use error::{parse_ordinal, CacheError, FiboError};
pub use generator::Generator;
pub use memory::MemoryCache;
pub use number::{Number, ParseNumberError};
pub use observer::{CacheEvent, ComputeObserver};
pub use observers::{CacheStats, LoggingObserver, NoOpObserver, StatsObserver};
pub use range::count_ordinals_in_range;

/// Compute F(n) with a throwaway in-memory cache.
///
/// Convenience for one-off calls. Long-lived callers should keep a
/// `Generator` so the cache is reused.
///
/// # Example
/// ```
/// assert_eq!(fibo_core::fibonacci(10).to_string(), "55");
/// assert_eq!(fibo_core::fibonacci(0).to_string(), "0");
/// ```
#[must_use]
pub fn fibonacci(n: u64) -> Number {
    Generator::new(std::sync::Arc::new(MemoryCache::new())).compute(n)
}
