//! Cache Statistics Module
//!
//! Tracks hits, misses and expiry activity with lock-free counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Live counters shared by the service and the reaper.
#[derive(Debug, Default)]
pub struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    lazy_evictions: AtomicU64,
    reaped: AtomicU64,
    decode_failures: AtomicU64,
    reaper_cycles: AtomicU64,
    reaper_failures: AtomicU64,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an expired entry removed by a read path.
    pub fn record_lazy_eviction(&self) {
        self.lazy_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one completed reaper sweep and the entries it removed.
    pub fn record_reaper_cycle(&self, removed: usize) {
        self.reaper_cycles.fetch_add(1, Ordering::Relaxed);
        self.reaped.fetch_add(removed as u64, Ordering::Relaxed);
    }

    /// Counts a sweep that aborted before finishing.
    pub fn record_reaper_failure(&self) {
        self.reaper_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters into a serializable snapshot.
    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            lazy_evictions: self.lazy_evictions.load(Ordering::Relaxed),
            reaped: self.reaped.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            reaper_cycles: self.reaper_cycles.load(Ordering::Relaxed),
            reaper_failures: self.reaper_failures.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing, an expired entry, or an undecodable one
    pub misses: u64,
    /// Expired entries removed by Get/Exists
    pub lazy_evictions: u64,
    /// Expired entries removed by the reaper
    pub reaped: u64,
    /// Entries dropped because they could not be decoded
    pub decode_failures: u64,
    /// Completed reaper sweeps
    pub reaper_cycles: u64,
    /// Reaper sweeps that aborted
    pub reaper_failures: u64,
    /// Entries physically present in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
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
    fn test_snapshot_starts_at_zero() {
        let stats = StatsCounters::new().snapshot(0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = StatsCounters::new().snapshot(0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::new();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.snapshot(1).hit_rate(), 0.75);
    }

    #[test]
    fn test_reaper_cycle_accumulates() {
        let counters = StatsCounters::new();
        counters.record_reaper_cycle(3);
        counters.record_reaper_cycle(0);
        counters.record_reaper_cycle(2);
        counters.record_reaper_failure();

        let stats = counters.snapshot(7);
        assert_eq!(stats.reaper_cycles, 3);
        assert_eq!(stats.reaped, 5);
        assert_eq!(stats.reaper_failures, 1);
        assert_eq!(stats.total_entries, 7);
    }

    #[test]
    fn test_eviction_counters() {
        let counters = StatsCounters::new();
        counters.record_lazy_eviction();
        counters.record_decode_failure();
        counters.record_decode_failure();

        let stats = counters.snapshot(0);
        assert_eq!(stats.lazy_evictions, 1);
        assert_eq!(stats.decode_failures, 2);
    }
}
