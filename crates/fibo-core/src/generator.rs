//! Memoized Fibonacci generator.
//!
//! `Generator::compute` resolves F(n) as F(n-1) + F(n-2), taking each
//! operand from the cache when present and otherwise computing it and
//! writing it back. The recursion is unrolled onto an explicit frame stack
//! so very large ordinals cannot exhaust the thread stack; the order of
//! cache reads and writes is the same as the recursive formulation:
//!
//! ```text
//! compute(n)        = resolve(n - 1) + resolve(n - 2)
//! resolve(k)        = cache.read(k) or { v = compute(k); cache.write(k, v); v }
//! ```
//!
//! On a cold cache this performs one write per ordinal below `n`
//! (smallest first) and `n - 1` additions. On a warm cache it performs two
//! reads and one addition.

use std::sync::Arc;

use tracing::{debug, debug_span, warn};

use crate::cache::Memoizer;
use crate::error::FiboError;
use crate::number::Number;
use crate::observer::{CacheEvent, ComputeObserver};
use crate::observers::NoOpObserver;
use crate::range::count_ordinals_in_range;

/// A pending `compute(ordinal)` call.
///
/// Every frame except the bottom one was entered through a cache miss and
/// writes its result back when it completes.
struct Frame {
    ordinal: u64,
    /// F(ordinal - 1) once resolved.
    first: Option<Number>,
}

impl Frame {
    fn new(ordinal: u64) -> Self {
        Self {
            ordinal,
            first: None,
        }
    }
}

/// Computes Fibonacci values through a shared cache.
///
/// Cheap to clone; clones share the cache and the observer.
#[derive(Clone)]
pub struct Generator {
    cache: Arc<dyn Memoizer>,
    observer: Arc<dyn ComputeObserver>,
}

impl Generator {
    /// Create a generator over `cache` with no observer.
    #[must_use]
    pub fn new(cache: Arc<dyn Memoizer>) -> Self {
        Self::with_observer(cache, Arc::new(NoOpObserver::new()))
    }

    /// Create a generator that reports cache traffic to `observer`.
    #[must_use]
    pub fn with_observer(cache: Arc<dyn Memoizer>, observer: Arc<dyn ComputeObserver>) -> Self {
        Self { cache, observer }
    }

    /// The cache this generator reads from and writes to.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn Memoizer> {
        &self.cache
    }

    /// The observer receiving cache events.
    #[must_use]
    pub fn observer(&self) -> &Arc<dyn ComputeObserver> {
        &self.observer
    }

    /// Compute F(n).
    ///
    /// Cache failures never abort the computation: a failed read is a miss
    /// and a failed write is logged and reported to the observer.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use fibo_core::{Generator, MemoryCache};
    ///
    /// let gen = Generator::new(Arc::new(MemoryCache::new()));
    /// assert_eq!(gen.compute(100).to_string(), "354224848179261915075");
    /// ```
    pub fn compute(&self, n: u64) -> Number {
        let _span = debug_span!("compute", ordinal = n).entered();
        debug!(ordinal = n, "Computing Fibonacci value");

        if n < 2 {
            return base_value(n);
        }

        // The outermost call stays out of the stack: it is the only frame
        // that returns its value instead of writing it back.
        let mut root = Frame::new(n);
        let mut stack: Vec<Frame> = Vec::new();
        // Value returned by the frame that was just popped.
        let mut returned: Option<Number> = None;
        // (k, F(k)) where k is one below the last completed frame; exactly
        // the value the enclosing frame asks for next.
        let mut recent: Option<(u64, Number)> = None;

        loop {
            let frame = match stack.last_mut() {
                Some(frame) => frame,
                None => &mut root,
            };
            let ordinal = frame.ordinal;

            let Some(a) = frame.first.take() else {
                if let Some(value) = returned.take() {
                    frame.first = Some(value);
                } else if let Some(value) = self.resolve(ordinal - 1, recent.as_ref()) {
                    frame.first = Some(value);
                } else {
                    stack.push(Frame::new(ordinal - 1));
                }
                continue;
            };

            let b = match returned.take() {
                Some(b) => b,
                None => {
                    if let Some(b) = self.resolve(ordinal - 2, recent.as_ref()) {
                        b
                    } else {
                        frame.first = Some(a);
                        stack.push(Frame::new(ordinal - 2));
                        continue;
                    }
                }
            };

            let value = &a + &b;
            recent = Some((ordinal - 1, a));
            if stack.pop().is_none() {
                return value;
            }
            self.store(ordinal, &value);
            returned = Some(value);
        }
    }

    /// Compute F(n) for a signed ordinal supplied by an external caller.
    ///
    /// Negative ordinals are rejected rather than mapped to a sentinel.
    pub fn compute_signed(&self, n: i64) -> Result<Number, FiboError> {
        let ordinal = u64::try_from(n).map_err(|_| {
            FiboError::InvalidArgument(format!("ordinal must be non-negative, got {n}"))
        })?;
        Ok(self.compute(ordinal))
    }

    /// Count the ordinals whose value lies in `[low, high]`.
    ///
    /// Does not touch the cache.
    pub fn find_ordinals_in_range(&self, low: &Number, high: &Number) -> Result<u64, FiboError> {
        count_ordinals_in_range(low, high)
    }

    /// Remove every entry from the underlying cache.
    pub fn clear_cache(&self) -> Result<(), FiboError> {
        let _span = debug_span!("clear", cache = self.cache.name()).entered();
        tracing::info!(cache = self.cache.name(), "Clearing the memoizer cache");
        self.cache.clear()?;
        Ok(())
    }

    /// Read `ordinal` from the cache. On a miss, produce the value locally
    /// when that needs no further descent (base cases, or the value the
    /// last completed frame already had in hand) and write it back.
    /// Returns `None` when the caller must push a frame for `ordinal`.
    fn resolve(&self, ordinal: u64, recent: Option<&(u64, Number)>) -> Option<Number> {
        let cached = {
            let _span = debug_span!("read", ordinal).entered();
            self.cache.read(ordinal)
        };
        match cached {
            Ok(Some(value)) => {
                self.observer.on_event(&CacheEvent::Hit(ordinal));
                return Some(value);
            }
            Ok(None) => self.observer.on_event(&CacheEvent::Miss(ordinal)),
            Err(err) => {
                debug!(ordinal, error = %err, "Cache read failed, treating as miss");
                self.observer.on_event(&CacheEvent::ReadFailed(ordinal));
            }
        }

        let value = if ordinal < 2 {
            base_value(ordinal)
        } else {
            match recent {
                Some((k, v)) if *k == ordinal => v.clone(),
                _ => return None,
            }
        };
        self.store(ordinal, &value);
        Some(value)
    }

    fn store(&self, ordinal: u64, value: &Number) {
        let _span = debug_span!("write", ordinal).entered();
        match self.cache.write(ordinal, value) {
            Ok(()) => self.observer.on_event(&CacheEvent::Stored(ordinal)),
            Err(err) => {
                warn!(ordinal, error = %err, "Failed to write cache entry");
                self.observer.on_event(&CacheEvent::WriteFailed(ordinal));
            }
        }
    }
}

fn base_value(n: u64) -> Number {
    if n == 0 {
        Number::zero()
    } else {
        Number::one()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;
    use crate::cache::NullCache;
    use crate::error::CacheError;
    use crate::memory::MemoryCache;
    use crate::observers::StatsObserver;

    const FIBONACCI: [u64; 21] = [
        0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987, 1597, 2584, 4181, 6765,
    ];

    fn reference(n: u64) -> Number {
        let mut a = Number::zero();
        let mut b = Number::one();
        for _ in 0..n {
            let next = &a + &b;
            a = std::mem::replace(&mut b, next);
        }
        a
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Read(u64),
        Write(u64),
    }

    /// Memory cache that records every operation.
    #[derive(Default)]
    struct RecordingCache {
        inner: MemoryCache,
        ops: Mutex<Vec<Op>>,
    }

    impl Memoizer for RecordingCache {
        fn read(&self, ordinal: u64) -> Result<Option<Number>, CacheError> {
            self.ops.lock().push(Op::Read(ordinal));
            self.inner.read(ordinal)
        }

        fn write(&self, ordinal: u64, value: &Number) -> Result<(), CacheError> {
            self.ops.lock().push(Op::Write(ordinal));
            self.inner.write(ordinal, value)
        }

        fn clear(&self) -> Result<(), CacheError> {
            self.ops.lock().clear();
            self.inner.clear()
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    /// Backend whose reads and writes always fail.
    struct BrokenCache;

    impl Memoizer for BrokenCache {
        fn read(&self, _ordinal: u64) -> Result<Option<Number>, CacheError> {
            Err(CacheError::Storage("connection refused".into()))
        }

        fn write(&self, _ordinal: u64, _value: &Number) -> Result<(), CacheError> {
            Err(CacheError::Storage("connection refused".into()))
        }

        fn clear(&self) -> Result<(), CacheError> {
            Err(CacheError::Storage("connection refused".into()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn known_values_without_cache() {
        let gen = Generator::new(Arc::new(NullCache::new()));
        for (n, expected) in FIBONACCI.iter().enumerate() {
            assert_eq!(gen.compute(n as u64), Number::from_unsigned(*expected), "F({n})");
        }
    }

    #[test]
    fn known_values_with_cache() {
        let gen = Generator::new(Arc::new(MemoryCache::new()));
        for (n, expected) in FIBONACCI.iter().enumerate() {
            assert_eq!(gen.compute(n as u64), Number::from_unsigned(*expected), "F({n})");
        }
    }

    #[test]
    fn f100_cold_and_warm() {
        let expected: Number = "354224848179261915075".parse().unwrap();
        let cold = Generator::new(Arc::new(NullCache::new()));
        assert_eq!(cold.compute(100), expected);

        let warm = Generator::new(Arc::new(MemoryCache::new()));
        assert_eq!(warm.compute(100), expected);
        assert_eq!(warm.compute(100), expected);
    }

    #[test]
    fn cold_cache_writes_every_lower_ordinal_smallest_first() {
        let cache = Arc::new(RecordingCache::default());
        let gen = Generator::new(cache.clone());
        assert_eq!(gen.compute(5), Number::from(5));

        let ops = cache.ops.lock().clone();
        let expected = vec![
            Op::Read(4),
            Op::Read(3),
            Op::Read(2),
            Op::Read(1),
            Op::Write(1),
            Op::Read(0),
            Op::Write(0),
            Op::Write(2),
            Op::Read(1),
            Op::Write(3),
            Op::Read(2),
            Op::Write(4),
            Op::Read(3),
        ];
        assert_eq!(ops, expected);
        assert_eq!(cache.inner.ordinals(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn outermost_call_is_never_written() {
        let cache = Arc::new(RecordingCache::default());
        let gen = Generator::new(cache.clone());
        assert_eq!(gen.compute(2), Number::from(1));

        let ops = cache.ops.lock().clone();
        assert_eq!(
            ops,
            vec![Op::Read(1), Op::Write(1), Op::Read(0), Op::Write(0)]
        );
        assert_eq!(cache.inner.ordinals(), vec![0, 1]);
    }

    #[test]
    fn warm_cache_needs_two_reads() {
        let cache = Arc::new(RecordingCache::default());
        let gen = Generator::new(cache.clone());
        gen.compute(30);
        cache.ops.lock().clear();

        assert_eq!(gen.compute(30), reference(30));
        assert_eq!(*cache.ops.lock(), vec![Op::Read(29), Op::Read(28)]);
    }

    #[test]
    fn second_call_has_no_misses() {
        let stats = Arc::new(StatsObserver::new());
        let gen = Generator::with_observer(Arc::new(MemoryCache::new()), stats.clone());

        let first = gen.compute(50);
        let cold = stats.snapshot();
        assert_eq!(cold.writes, 50);
        stats.reset();

        let second = gen.compute(50);
        assert_eq!(first, second);
        let warm = stats.snapshot();
        assert_eq!(warm.misses, 0);
        assert_eq!(warm.hits, 2);
        assert_eq!(warm.writes, 0);
    }

    #[test]
    fn always_miss_cache_stays_linear() {
        let stats = Arc::new(StatsObserver::new());
        let gen = Generator::with_observer(Arc::new(NullCache::new()), stats.clone());
        assert_eq!(gen.compute(90), reference(90));
        // Each frame misses at most twice.
        assert!(stats.snapshot().misses <= 2 * 90);
    }

    #[test]
    fn clear_forces_recompute() {
        let cache = Arc::new(MemoryCache::new());
        let stats = Arc::new(StatsObserver::new());
        let gen = Generator::with_observer(cache.clone(), stats.clone());

        gen.compute(20);
        assert_eq!(cache.len(), 20);
        gen.clear_cache().unwrap();
        assert!(cache.is_empty());

        stats.reset();
        assert_eq!(gen.compute(20), Number::from(6765));
        assert_eq!(stats.snapshot().writes, 20);
        assert_eq!(stats.snapshot().hits, 18);
    }

    #[test]
    fn partially_populated_cache() {
        // Only even ordinals present: the generator has to descend from
        // cache hits into gaps.
        let values: HashMap<u64, Number> = (0..40).step_by(2).map(|k| (k, reference(k))).collect();
        let gen = Generator::new(Arc::new(MemoryCache::with_values(values)));
        assert_eq!(gen.compute(41), reference(41));
        assert_eq!(gen.compute(44), reference(44));
    }

    #[test]
    fn backend_failures_do_not_abort() {
        let stats = Arc::new(StatsObserver::new());
        let gen = Generator::with_observer(Arc::new(BrokenCache), stats.clone());
        assert_eq!(gen.compute(25), reference(25));

        let snap = stats.snapshot();
        assert_eq!(snap.hits, 0);
        assert!(snap.read_failures > 0);
        assert!(snap.write_failures > 0);
        assert_eq!(snap.writes, 0);
    }

    #[test]
    fn clear_reports_backend_failure() {
        let gen = Generator::new(Arc::new(BrokenCache));
        assert!(matches!(gen.clear_cache(), Err(FiboError::Cache(_))));
    }

    #[test]
    fn large_ordinal_does_not_overflow_stack() {
        let gen = Generator::new(Arc::new(MemoryCache::new()));
        assert_eq!(gen.compute(20_000), reference(20_000));
    }

    #[test]
    fn compute_signed_rejects_negative() {
        let gen = Generator::new(Arc::new(MemoryCache::new()));
        assert_eq!(gen.compute_signed(10).unwrap(), Number::from(55));
        assert!(matches!(
            gen.compute_signed(-1),
            Err(FiboError::InvalidArgument(_))
        ));
    }

    #[test]
    fn range_counting_delegates() {
        let gen = Generator::new(Arc::new(NullCache::new()));
        let count = gen
            .find_ordinals_in_range(&Number::from(0), &Number::from(10))
            .unwrap();
        assert_eq!(count, 7);
    }

    #[test]
    fn clones_share_the_cache() {
        let cache = Arc::new(MemoryCache::new());
        let gen = Generator::new(cache.clone());
        let other = gen.clone();
        gen.compute(10);
        assert_eq!(other.cache().read(9).unwrap(), Some(Number::from(34)));
    }
}
