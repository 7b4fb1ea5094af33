//! Cache Statistics Module
//!
//! Tracks listing cache activity: hits, misses, refreshes and invalidations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks listing cache activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Unfiltered reads answered from the snapshot
    pub hits: u64,
    /// Unfiltered reads that found no valid snapshot
    pub misses: u64,
    /// Snapshots written from the store
    pub refreshes: u64,
    /// Snapshots dropped by mutations or the sweep task
    pub invalidations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }
}
