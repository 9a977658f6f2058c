//! Bulk market snapshot cache
//!
//! Holds at most one [`MarketSnapshot`] covering every category, refreshed
//! as a unit on the scheduler cadence rather than lazily on read, so the
//! tick thread never waits on the network. A read during staleness still
//! returns the last-known snapshot while a background refresh is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::constants::SNAPSHOT_TTL_MS;
use crate::types::MarketSnapshot;

/// Single-slot cache for the bulk market document
pub struct SnapshotCache {
    slot: RwLock<Option<Arc<MarketSnapshot>>>,
    ttl: Duration,
    // Single global in-flight gate; there is only one snapshot, so the
    // per-key tracker discipline collapses to one boolean.
    refreshing: AtomicBool,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_millis(SNAPSHOT_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
            refreshing: AtomicBool::new(false),
        }
    }

    /// The last-known snapshot, stale or not; `None` only before the first
    /// successful refresh
    pub fn current(&self) -> Option<Arc<MarketSnapshot>> {
        self.slot.read().ok()?.clone()
    }

    /// True when never fetched or older than the TTL
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Instant::now())
    }

    fn is_stale_at(&self, now: Instant) -> bool {
        match self.current() {
            Some(snapshot) => now.saturating_duration_since(snapshot.fetched_at) > self.ttl,
            None => true,
        }
    }

    /// Replaces the snapshot wholesale
    pub fn store(&self, snapshot: MarketSnapshot) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(Arc::new(snapshot));
        }
    }

    /// Claims the refresh gate, returning a release-on-drop guard, or `None`
    /// if a refresh is already in flight
    pub fn begin_refresh(self: &Arc<Self>) -> Option<SnapshotRefreshGuard> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(SnapshotRefreshGuard {
                cache: Arc::clone(self),
            })
        } else {
            None
        }
    }

    /// Drops the snapshot and resets the refresh gate
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
        self.refreshing.store(false, Ordering::Release);
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped refresh gate; released on drop on every exit path
pub struct SnapshotRefreshGuard {
    cache: Arc<SnapshotCache>,
}

impl Drop for SnapshotRefreshGuard {
    fn drop(&mut self) {
        self.cache.refreshing.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn empty_snapshot() -> MarketSnapshot {
        MarketSnapshot::new(HashMap::new())
    }

    #[test]
    fn never_fetched_is_stale() {
        let cache = SnapshotCache::new();
        assert!(cache.is_stale());
        assert!(cache.current().is_none());
    }

    #[test]
    fn fresh_snapshot_is_not_stale_until_ttl() {
        let cache = SnapshotCache::with_ttl(Duration::from_secs(30));
        let snapshot = empty_snapshot();
        let fetched_at = snapshot.fetched_at;
        cache.store(snapshot);

        assert!(!cache.is_stale_at(fetched_at + Duration::from_secs(29)));
        assert!(cache.is_stale_at(fetched_at + Duration::from_secs(31)));
    }

    #[test]
    fn stale_snapshot_still_readable() {
        let cache = SnapshotCache::with_ttl(Duration::from_millis(0));
        cache.store(empty_snapshot());
        assert!(cache.current().is_some());
    }

    #[test]
    fn refresh_gate_admits_one_at_a_time() {
        let cache = Arc::new(SnapshotCache::new());
        let guard = cache.begin_refresh().unwrap();
        assert!(cache.begin_refresh().is_none());
        drop(guard);
        assert!(cache.begin_refresh().is_some());
    }

    #[test]
    fn clear_drops_snapshot_and_gate() {
        let cache = Arc::new(SnapshotCache::new());
        cache.store(empty_snapshot());
        let _leaked = std::mem::ManuallyDrop::new(cache.begin_refresh().unwrap());
        cache.clear();
        assert!(cache.current().is_none());
        assert!(cache.begin_refresh().is_some());
    }
}
