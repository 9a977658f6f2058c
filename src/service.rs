//! Widget-scoped market data service
//!
//! One `MarketService` per widget context bundles the price cache, the bulk
//! snapshot, the in-flight tracker and the refresh scheduler. Every method
//! reachable from the host tick is non-blocking: reads come from the
//! concurrent caches and all network work runs on background tasks.
//!
//! Lifecycle is Stopped -> Running -> Stopped. Stopping clears every cache
//! and releases every in-flight marker - a context switch redefines the
//! meaning of every cached key, so partial invalidation is never attempted.

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{
    cache::PriceCache,
    error::FetchError,
    inflight::InflightTracker,
    provider::MarketApi,
    scheduler::{refresh_snapshot_once, RefreshScheduler},
    snapshot::SnapshotCache,
    types::{ItemKey, MarketSnapshot, PriceRecord},
};

/// Cache-and-refresh engine behind the price widgets
pub struct MarketService {
    api: Arc<dyn MarketApi>,
    prices: Arc<PriceCache>,
    snapshot: Arc<SnapshotCache>,
    inflight: Arc<InflightTracker>,
    scheduler: RefreshScheduler,
    runtime: Handle,
    // One token per Running generation; stop cancels it and installs a
    // fresh one so one-shot fetches die with the context that spawned them.
    fetch_cancel: Mutex<CancellationToken>,
}

impl MarketService {
    /// Creates a stopped service; `runtime` hosts all background fetches
    pub fn new(api: Arc<dyn MarketApi>, runtime: Handle) -> Self {
        Self {
            api,
            prices: Arc::new(PriceCache::new()),
            snapshot: Arc::new(SnapshotCache::new()),
            inflight: Arc::new(InflightTracker::new()),
            scheduler: RefreshScheduler::new(),
            runtime,
            fetch_cancel: Mutex::new(CancellationToken::new()),
        }
    }

    fn fetch_token(&self) -> CancellationToken {
        self.fetch_cancel
            .lock()
            .map(|token| token.clone())
            .unwrap_or_default()
    }

    /// Starts the background refresh loops; no-op while running
    pub fn ensure_started(&self) {
        self.scheduler.start(
            &self.runtime,
            Arc::clone(&self.api),
            Arc::clone(&self.prices),
            Arc::clone(&self.snapshot),
        );
    }

    /// Stops all background work and invalidates everything
    ///
    /// Cancels the scheduler loops and every in-flight one-shot fetch
    /// before clearing, so nothing spawned under the old context can write
    /// into the restarted caches. Restart always begins fully empty.
    pub fn stop(&self) {
        if !self.scheduler.is_running() {
            return;
        }
        self.scheduler.stop();
        if let Ok(mut token) = self.fetch_cancel.lock() {
            token.cancel();
            *token = CancellationToken::new();
        }
        self.prices.clear();
        self.snapshot.clear();
        self.inflight.clear();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Cache-only price read; never blocks, never triggers I/O
    pub fn cached_price(&self, key: &ItemKey) -> Option<PriceRecord> {
        self.prices.get(key)
    }

    /// The last-known bulk snapshot, if any
    pub fn current_snapshot(&self) -> Option<Arc<MarketSnapshot>> {
        self.snapshot.current()
    }

    /// Kicks off a background single-item fetch unless the cache is fresh
    /// or a fetch for the key is already in flight
    pub fn request_price(&self, key: &ItemKey) {
        if self.prices.get(key).is_some() {
            return;
        }
        let Some(guard) = self.inflight.acquire(key.clone()) else {
            return;
        };

        let api = Arc::clone(&self.api);
        let prices = Arc::clone(&self.prices);
        let key = key.clone();
        let cancel = self.fetch_token();
        self.runtime.spawn(async move {
            // Guard released on drop, on every exit path of the fetch.
            let _guard = guard;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = fetch_price_into(&api, &prices, &key) => {}
            }
        });
    }

    /// Fetches a single item price immediately, bypassing the in-flight gate
    pub async fn refresh_price_now(&self, key: &ItemKey) {
        fetch_price_into(&self.api, &self.prices, key).await;
    }

    /// Resolves a price through the cache with the snapshot as fallback
    ///
    /// A snapshot hit (or confirmed absence) is written back to the price
    /// cache stamped with the snapshot's own fetch time, so the entry ages
    /// with the data it came from and a stale snapshot never masquerades as
    /// a fresh fetch. `None` means no market data is available at all yet;
    /// a background snapshot refresh has been requested in that case. A
    /// stale-but-present snapshot is still served while its refresh runs.
    pub fn resolve_price(&self, key: &ItemKey) -> Option<PriceRecord> {
        if let Some(record) = self.prices.get(key) {
            return Some(record);
        }

        if self.snapshot.is_stale() {
            self.request_snapshot_refresh();
        }

        let snapshot = self.snapshot.current()?;
        let record = snapshot.find_item(key);
        self.prices.put_at(key.clone(), record, snapshot.fetched_at);
        Some(record)
    }

    /// Kicks off a background snapshot refresh unless one is in flight
    pub fn request_snapshot_refresh(&self) {
        let api = Arc::clone(&self.api);
        let snapshot = Arc::clone(&self.snapshot);
        let cancel = self.fetch_token();
        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = refresh_snapshot_once(&api, &snapshot) => {}
            }
        });
    }

    /// Refreshes the snapshot immediately, respecting the refresh gate
    pub async fn refresh_snapshot_now(&self) {
        refresh_snapshot_once(&self.api, &self.snapshot).await;
    }

    pub(crate) fn api(&self) -> Arc<dyn MarketApi> {
        Arc::clone(&self.api)
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.runtime
    }
}

/// The single boundary between fetch results and cache state
///
/// Success and authoritative 404 become cache writes; every transient
/// failure is logged and dropped so the next cycle retries.
async fn fetch_price_into(api: &Arc<dyn MarketApi>, prices: &Arc<PriceCache>, key: &ItemKey) {
    match api.fetch_item_price(key).await {
        Ok(record) => {
            tracing::debug!(key = %key, found = record.found, "price fetched");
            prices.put(key.clone(), record);
        }
        Err(FetchError::NotFound(_)) => {
            tracing::debug!(key = %key, "item has no listings");
            prices.put(key.clone(), PriceRecord::not_found());
        }
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "price fetch failed, retrying next cycle");
        }
    }
}
