//! Concrete observer implementations.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::observer::{CacheEvent, ComputeObserver};

/// Null object pattern — does nothing with cache events.
#[derive(Debug, Default)]
pub struct NoOpObserver;

impl NoOpObserver {
    /// Create a new no-op observer that discards all events.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ComputeObserver for NoOpObserver {
    fn on_event(&self, _event: &CacheEvent) {}
}

/// Observer that forwards cache events to `tracing`.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ComputeObserver for LoggingObserver {
    fn on_event(&self, event: &CacheEvent) {
        match *event {
            CacheEvent::Hit(ordinal) => debug!(ordinal, "Found cached value"),
            CacheEvent::Miss(ordinal) => debug!(ordinal, "Missed cached value"),
            CacheEvent::ReadFailed(ordinal) => {
                debug!(ordinal, "Cache read failed, treating as miss");
            }
            CacheEvent::Stored(ordinal) => debug!(ordinal, "Wrote cache entry"),
            CacheEvent::WriteFailed(ordinal) => warn!(ordinal, "Failed to write cache entry"),
        }
    }
}

/// Snapshot of cache traffic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub read_failures: u64,
    pub writes: u64,
    pub write_failures: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, in [0.0, 1.0].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses + self.read_failures;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Observer that counts events with atomic counters.
#[derive(Debug, Default)]
pub struct StatsObserver {
    hits: AtomicU64,
    misses: AtomicU64,
    read_failures: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
}

impl StatsObserver {
    /// Create new zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a snapshot of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.read_failures.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
    }
}

impl ComputeObserver for StatsObserver {
    fn on_event(&self, event: &CacheEvent) {
        let counter = match event {
            CacheEvent::Hit(_) => &self.hits,
            CacheEvent::Miss(_) => &self.misses,
            CacheEvent::ReadFailed(_) => &self.read_failures,
            CacheEvent::Stored(_) => &self.writes,
            CacheEvent::WriteFailed(_) => &self.write_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fans each event out to several observers in order.
pub struct CompositeObserver {
    observers: Vec<std::sync::Arc<dyn ComputeObserver>>,
}

impl CompositeObserver {
    #[must_use]
    pub fn new(observers: Vec<std::sync::Arc<dyn ComputeObserver>>) -> Self {
        Self { observers }
    }
}

impl ComputeObserver for CompositeObserver {
    fn on_event(&self, event: &CacheEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn noop_observer_does_nothing() {
        let observer = NoOpObserver::new();
        observer.on_event(&CacheEvent::Hit(1));
    }

    #[test]
    fn logging_observer_handles_every_event() {
        let observer = LoggingObserver::new();
        for event in [
            CacheEvent::Hit(1),
            CacheEvent::Miss(2),
            CacheEvent::ReadFailed(3),
            CacheEvent::Stored(4),
            CacheEvent::WriteFailed(5),
        ] {
            observer.on_event(&event);
        }
    }

    #[test]
    fn stats_observer_counts() {
        let stats = StatsObserver::new();
        stats.on_event(&CacheEvent::Hit(1));
        stats.on_event(&CacheEvent::Hit(2));
        stats.on_event(&CacheEvent::Miss(3));
        stats.on_event(&CacheEvent::Stored(3));
        stats.on_event(&CacheEvent::WriteFailed(4));

        let snap = stats.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.write_failures, 1);
        assert_eq!(snap.read_failures, 0);

        stats.reset();
        assert_eq!(stats.snapshot(), CacheStats::default());
    }

    #[test]
    fn hit_ratio() {
        assert!((CacheStats::default().hit_ratio()).abs() < f64::EPSILON);
        let snap = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((snap.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn composite_fans_out() {
        let a = Arc::new(StatsObserver::new());
        let b = Arc::new(StatsObserver::new());
        let composite =
            CompositeObserver::new(vec![a.clone() as Arc<dyn ComputeObserver>, b.clone()]);
        composite.on_event(&CacheEvent::Miss(1));
        assert_eq!(a.snapshot().misses, 1);
        assert_eq!(b.snapshot().misses, 1);
    }
}
