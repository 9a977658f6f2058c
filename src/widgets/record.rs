//! Player record widget engine
//!
//! Shows the all-time player-count record as a single line. One value on a
//! slow poll: the refresh loop writes the latest count (or nothing, after a
//! failed fetch) into a shared slot and the tick path renders whatever is
//! there. No record means the line stays hidden.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::constants::RECORD_REFRESH_MS;
use crate::display::{ChangeDetector, RenderLine};
use crate::service::MarketService;
use crate::settings::HudSettings;

type RecordSlot = Arc<RwLock<Option<u64>>>;

/// Engine behind the player record line
pub struct RecordWidget {
    service: Arc<MarketService>,
    settings: Arc<HudSettings>,
    record: RecordSlot,
    detector: ChangeDetector<Option<u64>>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl RecordWidget {
    pub fn new(service: Arc<MarketService>, settings: Arc<HudSettings>) -> Self {
        Self {
            service,
            settings,
            record: Arc::new(RwLock::new(None)),
            detector: ChangeDetector::new(),
            cancel: None,
            task: None,
        }
    }

    /// Host tick; `editor` is true on the settings preview screen
    pub fn on_tick(&mut self, line: &mut dyn RenderLine, editor: bool) {
        if editor {
            line.set_text("468".to_string());
            line.set_visible(true);
            return;
        }

        if !self.settings.enabled() {
            line.set_visible(false);
            self.stop_refresh_task();
            if let Ok(mut slot) = self.record.write() {
                *slot = None;
            }
            self.detector.reset();
            return;
        }

        self.ensure_refresh_task();

        let current = self.record.read().ok().and_then(|slot| *slot);
        if self.detector.update(current) {
            match current {
                Some(record) => {
                    line.set_text(record.to_string());
                    line.set_visible(true);
                }
                None => line.set_visible(false),
            }
        }
    }

    fn ensure_refresh_task(&mut self) {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let api = self.service.api();
        let slot = Arc::clone(&self.record);
        let task_cancel = cancel.clone();

        let task = self.service.runtime().spawn(async move {
            let interval = Duration::from_millis(RECORD_REFRESH_MS);
            loop {
                let record = match api.fetch_player_record().await {
                    Ok(record) => Some(record),
                    Err(err) => {
                        tracing::warn!(error = %err, "record fetch failed");
                        None
                    }
                };
                if let Ok(mut current) = slot.write() {
                    *current = record;
                }
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = sleep(interval) => {}
                }
            }
        });

        self.cancel = Some(cancel);
        self.task = Some(task);
    }

    fn stop_refresh_task(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RecordWidget {
    fn drop(&mut self) {
        self.stop_refresh_task();
    }
}
