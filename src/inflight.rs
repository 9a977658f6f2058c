//! In-flight request tracking
//!
//! Prevents N concurrent ticks from issuing N redundant HTTP requests for
//! the same key. The marker is released through an RAII guard so every
//! acquisition is paired with exactly one release on every exit path - a
//! leaked marker would permanently block retries for that key.
//!
//! `clear` advances an epoch; guards acquired before a clear become inert
//! and never release a marker that a later fetch re-acquired for the same
//! key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::types::ItemKey;

/// Tracks which keys currently have a fetch executing
#[derive(Default)]
pub struct InflightTracker {
    keys: DashMap<ItemKey, ()>,
    epoch: AtomicU64,
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically marks `key` as in-flight, returning a release-on-drop
    /// guard, or `None` if a fetch for the key is already executing
    pub fn acquire(self: &Arc<Self>, key: ItemKey) -> Option<InflightGuard> {
        let epoch = self.epoch.load(Ordering::Acquire);
        if self.try_acquire(&key) {
            Some(InflightGuard {
                tracker: Arc::clone(self),
                key,
                epoch,
            })
        } else {
            None
        }
    }

    /// Atomic check-and-set; true iff no marker existed for the key
    pub fn try_acquire(&self, key: &ItemKey) -> bool {
        match self.keys.entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                true
            }
        }
    }

    /// Unconditionally clears the marker for a key
    pub fn release(&self, key: &ItemKey) {
        self.keys.remove(key);
    }

    /// Releases every marker and invalidates outstanding guards; used when
    /// the widget context is torn down
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Scoped in-flight marker; releasing happens on drop regardless of how the
/// owning fetch task exits
///
/// A guard that outlives a `clear` is a no-op on drop; its marker is gone
/// and the key may belong to a newer fetch.
pub struct InflightGuard {
    tracker: Arc<InflightTracker>,
    key: ItemKey,
    epoch: u64,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.tracker.epoch.load(Ordering::Acquire) == self.epoch {
            self.tracker.release(&self.key);
        }
    }
}
