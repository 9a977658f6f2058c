//! Periodic background refresh tasks
//!
//! One scheduler per widget context owns the snapshot refresh loop and the
//! cache sweep loop. Both are cancellable through a shared token; stopping
//! aborts outright with no graceful drain, since every cache is cleared by
//! the owner right after.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::cache::PriceCache;
use crate::constants::{SNAPSHOT_TTL_MS, SWEEP_INTERVAL_MS};
use crate::provider::MarketApi;
use crate::snapshot::SnapshotCache;

struct Running {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Stopped/Running periodic task runner
pub struct RefreshScheduler {
    state: Mutex<Option<Running>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Spawns the refresh loops; no-op while already running
    pub fn start(
        &self,
        runtime: &Handle,
        api: Arc<dyn MarketApi>,
        prices: Arc<PriceCache>,
        snapshot: Arc<SnapshotCache>,
    ) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.is_some() {
            return;
        }

        tracing::info!(
            snapshot_interval_ms = SNAPSHOT_TTL_MS,
            sweep_interval_ms = SWEEP_INTERVAL_MS,
            "starting market refresh scheduler"
        );

        let cancel = CancellationToken::new();
        let mut tasks = Vec::with_capacity(2);

        {
            let cancel = cancel.clone();
            let api = Arc::clone(&api);
            let snapshot = Arc::clone(&snapshot);
            tasks.push(runtime.spawn(async move {
                let interval = Duration::from_millis(SNAPSHOT_TTL_MS);
                loop {
                    refresh_snapshot_once(&api, &snapshot).await;
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = sleep(interval) => {}
                    }
                }
            }));
        }

        {
            let cancel = cancel.clone();
            tasks.push(runtime.spawn(async move {
                let interval = Duration::from_millis(SWEEP_INTERVAL_MS);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = sleep(interval) => {}
                    }
                    let removed = prices.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "swept expired price cache entries");
                    }
                }
            }));
        }

        *state = Some(Running { cancel, tasks });
    }

    /// Cancels and aborts every loop; no-op while stopped
    pub fn stop(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Some(running) = state.take() {
            tracing::info!("stopping market refresh scheduler");
            running.cancel.cancel();
            for task in running.tasks {
                task.abort();
            }
        }
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Refreshes the snapshot if no other refresh holds the gate
///
/// Failures are logged and dropped; the stale snapshot stays in place and
/// the next cycle retries.
pub(crate) async fn refresh_snapshot_once(api: &Arc<dyn MarketApi>, cache: &Arc<SnapshotCache>) {
    let Some(_guard) = cache.begin_refresh() else {
        return;
    };

    match api.fetch_snapshot().await {
        Ok(snapshot) => {
            tracing::debug!(
                categories = snapshot.categories.len(),
                provider = api.name(),
                "market snapshot refreshed"
            );
            cache.store(snapshot);
        }
        Err(err) => {
            tracing::warn!(error = %err, "market snapshot refresh failed");
        }
    }
}
