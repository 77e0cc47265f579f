//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, load-throughs, misses,
//! expirations and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups served from memory
    pub hits: u64,
    /// Lookups served by loading the file from disk
    pub loads: u64,
    /// Failed lookups (not found, directory, too large)
    pub misses: u64,
    /// Items removed because their TTL elapsed
    pub expirations: u64,
    /// Items dropped from memory to respect `max_items`
    pub evictions: u64,
    /// Current number of items resident in memory
    pub resident: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the fraction of lookups that succeeded.
    ///
    /// Returns (hits + loads) / (hits + loads + misses), or 0.0 if no
    /// lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.loads;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by foreground calls and the vacuum task.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    loads: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Builds a snapshot with the given resident count.
    pub(crate) fn snapshot(&self, resident: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            resident,
        }
    }
}
