//! TTL-based per-item price cache
//!
//! Read on every host tick and written from background fetch tasks, so the
//! map must support concurrent access without external locking. `DashMap`
//! keeps tick-thread reads non-blocking while the scheduler sweeps and the
//! fetch tasks write.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::constants::{PRICE_TTL_MS, SWEEP_AGE_FACTOR};
use crate::types::{ItemKey, PriceRecord};

/// An immutable cached value with its fetch timestamp
///
/// Entries are replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, fetched_at: Instant) -> Self {
        Self { value, fetched_at }
    }

    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }
}

/// Concurrent item-price cache with TTL staleness
///
/// Policy: an entry older than the TTL is an immediate miss and is never
/// served stale. The periodic sweep reclaims entries past twice the TTL so
/// the map stays bounded even for keys nobody asks about again.
pub struct PriceCache {
    entries: DashMap<ItemKey, CacheEntry<PriceRecord>>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_millis(PRICE_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached record iff it is younger than the TTL
    ///
    /// Never blocks and never triggers I/O; a miss simply means "not fresh".
    pub fn get(&self, key: &ItemKey) -> Option<PriceRecord> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &ItemKey, now: Instant) -> Option<PriceRecord> {
        let entry = self.entries.get(key)?;
        if entry.age(now) < self.ttl {
            Some(entry.value)
        } else {
            None
        }
    }

    /// Stores a record with the current timestamp, overwriting any prior
    /// entry unconditionally (last-write-wins, no merge)
    pub fn put(&self, key: ItemKey, record: PriceRecord) {
        self.put_at(key, record, Instant::now());
    }

    pub(crate) fn put_at(&self, key: ItemKey, record: PriceRecord, now: Instant) {
        self.entries.insert(key, CacheEntry::new(record, now));
    }

    /// Evicts entries older than twice the TTL
    ///
    /// O(n) over the map; runs on the scheduler task concurrently with
    /// tick-thread reads.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let cutoff = self.ttl * SWEEP_AGE_FACTOR;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.age(now) <= cutoff);
        before - self.entries.len()
    }

    /// Drops every entry; used when the widget context is torn down
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(buy: f64) -> PriceRecord {
        PriceRecord {
            found: true,
            buy_price: Some(buy),
            sell_price: None,
        }
    }

    #[test]
    fn put_then_get_within_ttl_returns_value() {
        let cache = PriceCache::with_ttl(Duration::from_secs(30));
        let key = ItemKey::new("DIAMOND");
        cache.put(key.clone(), record(100.0));
        assert_eq!(cache.get(&key), Some(record(100.0)));
    }

    #[test]
    fn get_after_ttl_is_a_miss() {
        let cache = PriceCache::with_ttl(Duration::from_secs(30));
        let key = ItemKey::new("DIAMOND");
        let start = Instant::now();
        cache.put_at(key.clone(), record(100.0), start);

        assert!(cache
            .get_at(&key, start + Duration::from_secs(29))
            .is_some());
        assert!(cache
            .get_at(&key, start + Duration::from_secs(31))
            .is_none());
    }

    #[test]
    fn put_overwrites_unconditionally() {
        let cache = PriceCache::new();
        let key = ItemKey::new("DIAMOND");
        cache.put(key.clone(), record(100.0));
        cache.put(key.clone(), record(50.0));
        assert_eq!(cache.get(&key), Some(record(50.0)));
    }

    #[test]
    fn sweep_reclaims_entries_past_twice_the_ttl() {
        let cache = PriceCache::with_ttl(Duration::from_secs(30));
        let start = Instant::now();
        cache.put_at(ItemKey::new("OLD"), record(1.0), start);
        cache.put_at(
            ItemKey::new("FRESH"),
            record(2.0),
            start + Duration::from_secs(50),
        );

        let removed = cache.sweep_at(start + Duration::from_secs(61));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache
            .get_at(&ItemKey::new("FRESH"), start + Duration::from_secs(61))
            .is_some());
    }

    #[test]
    fn normalized_keys_hit_regardless_of_input_case() {
        let cache = PriceCache::new();
        cache.put(ItemKey::new("diamond"), record(100.0));
        assert!(cache.get(&ItemKey::new("DIAMOND")).is_some());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = PriceCache::new();
        cache.put(ItemKey::new("DIAMOND"), record(100.0));
        cache.clear();
        assert!(cache.is_empty());
    }
}
