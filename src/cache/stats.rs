//! Cache Statistics Module
//!
//! Tracks caching-layer metrics. Counters are atomic because the layer is
//! shared across request tasks; `snapshot` yields a consistent-enough copy
//! for the stats endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Shared performance counters for the caching layer.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Cache hits on item entries
    hits: AtomicU64,
    /// Cache misses that fell through to the store path
    misses: AtomicU64,
    /// Hits on negative (known-invalid) markers
    negative_hits: AtomicU64,
    /// Lookups rejected outright by the membership filter
    filter_rejections: AtomicU64,
    /// Point fetches issued to the backing store
    store_fetches: AtomicU64,
    /// Lock acquisitions that exhausted their retry budget
    lock_timeouts: AtomicU64,
    /// Lock releases that failed; the lease TTL frees those locks instead
    lock_release_failures: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Recorders ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the negative-hit counter.
    pub fn record_negative_hit(&self) {
        self.negative_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the filter-rejection counter.
    pub fn record_filter_rejection(&self) {
        self.filter_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the store-fetch counter.
    pub fn record_store_fetch(&self) {
        self.store_fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the lock-timeout counter.
    pub fn record_lock_timeout(&self) {
        self.lock_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the lock-release-failure counter.
    pub fn record_lock_release_failure(&self) {
        self.lock_release_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            negative_hits: self.negative_hits.load(Ordering::Relaxed),
            filter_rejections: self.filter_rejections.load(Ordering::Relaxed),
            store_fetches: self.store_fetches.load(Ordering::Relaxed),
            lock_timeouts: self.lock_timeouts.load(Ordering::Relaxed),
            lock_release_failures: self.lock_release_failures.load(Ordering::Relaxed),
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub negative_hits: u64,
    pub filter_rejections: u64,
    pub store_fetches: u64,
    pub lock_timeouts: u64,
    pub lock_release_failures: u64,
}

impl StatsSnapshot {
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let snapshot = CacheStats::new().snapshot();
        assert_eq!(snapshot.hits, 0);
        assert_eq!(snapshot.misses, 0);
        assert_eq!(snapshot.negative_hits, 0);
        assert_eq!(snapshot.filter_rejections, 0);
        assert_eq!(snapshot.store_fetches, 0);
        assert_eq!(snapshot.lock_timeouts, 0);
        assert_eq!(snapshot.lock_release_failures, 0);
    }

    #[test]
    fn test_recorders_increment() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_negative_hit();
        stats.record_filter_rejection();
        stats.record_store_fetch();
        stats.record_lock_timeout();
        stats.record_lock_release_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.negative_hits, 1);
        assert_eq!(snapshot.filter_rejections, 1);
        assert_eq!(snapshot.store_fetches, 1);
        assert_eq!(snapshot.lock_timeouts, 1);
        assert_eq!(snapshot.lock_release_failures, 1);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(StatsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.snapshot().hit_rate(), 0.5);
    }
}
