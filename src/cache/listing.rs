//! Listing Cache Module
//!
//! A single shared slot holding the last unfiltered, unpaginated property list.

use std::sync::Arc;

use crate::cache::CacheStats;
use crate::models::Property;

// == Listing Cache ==
/// Snapshot of the unfiltered listing with its write time and TTL.
///
/// The snapshot is valid only while `now - timestamp < ttl`. Writes always
/// replace the whole slot; nothing is merged.
#[derive(Debug)]
pub struct ListingCache {
    snapshot: Option<Arc<Vec<Property>>>,
    /// Write time of the snapshot (Unix milliseconds)
    timestamp: u64,
    /// Time-to-live in milliseconds
    ttl_ms: u64,
    stats: CacheStats,
}

impl ListingCache {
    // == Constructor ==
    /// Creates an empty cache with the given TTL in milliseconds.
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            snapshot: None,
            timestamp: 0,
            ttl_ms,
            stats: CacheStats::new(),
        }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    // == Validity ==
    /// True when a snapshot exists and its age is below the TTL.
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        self.snapshot.is_some() && now_ms.saturating_sub(self.timestamp) < self.ttl_ms
    }

    // == Get ==
    /// Returns the snapshot if still valid, recording a hit or a miss.
    pub fn get(&mut self, now_ms: u64) -> Option<Arc<Vec<Property>>> {
        if self.is_valid_at(now_ms) {
            self.stats.record_hit();
            self.snapshot.clone()
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Store ==
    /// Replaces the slot with a fresh snapshot taken at `now_ms`.
    pub fn store(&mut self, properties: Vec<Property>, now_ms: u64) {
        self.snapshot = Some(Arc::new(properties));
        self.timestamp = now_ms;
        self.stats.record_refresh();
    }

    // == Invalidate ==
    /// Empties the slot regardless of remaining TTL.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
        self.timestamp = 0;
        self.stats.record_invalidation();
    }

    // == Clear Expired ==
    /// Drops a stale snapshot. Returns true if one was removed.
    pub fn clear_expired(&mut self, now_ms: u64) -> bool {
        if self.snapshot.is_some() && !self.is_valid_at(now_ms) {
            self.invalidate();
            true
        } else {
            false
        }
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProperty;
    use chrono::Utc;

    fn snapshot(n: usize) -> Vec<Property> {
        (0..n)
            .map(|i| Property::from_new(i.to_string(), NewProperty::new("Casa", 1.0), Utc::now()))
            .collect()
    }

    #[test]
    fn test_empty_cache_misses() {
        let mut cache = ListingCache::new(60_000);
        assert!(cache.is_empty());
        assert!(cache.get(0).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_store_then_hit_within_ttl() {
        let mut cache = ListingCache::new(1_000);
        cache.store(snapshot(3), 10_000);

        let hit = cache.get(10_999).unwrap();
        assert_eq!(hit.len(), 3);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().refreshes, 1);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let mut cache = ListingCache::new(1_000);
        cache.store(snapshot(1), 10_000);

        // Valid strictly below the TTL, stale once it has fully elapsed
        assert!(cache.is_valid_at(10_999));
        assert!(!cache.is_valid_at(11_000));
        assert!(cache.get(11_000).is_none());
    }

    #[test]
    fn test_invalidate_ignores_remaining_ttl() {
        let mut cache = ListingCache::new(60_000);
        cache.store(snapshot(2), 0);
        cache.invalidate();

        assert!(cache.is_empty());
        assert!(cache.get(1).is_none());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_store_replaces_previous_snapshot() {
        let mut cache = ListingCache::new(60_000);
        cache.store(snapshot(2), 0);
        cache.store(snapshot(5), 100);
        assert_eq!(cache.get(100).unwrap().len(), 5);
    }

    #[test]
    fn test_zero_ttl_never_valid() {
        let mut cache = ListingCache::new(0);
        cache.store(snapshot(1), 500);
        assert!(cache.get(500).is_none());
    }

    #[test]
    fn test_clear_expired() {
        let mut cache = ListingCache::new(1_000);
        cache.store(snapshot(1), 0);
        assert!(!cache.clear_expired(500));
        assert!(cache.clear_expired(1_500));
        assert!(cache.is_empty());
        assert!(!cache.clear_expired(2_000));
    }
}
