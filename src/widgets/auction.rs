//! Auction listing widget engine
//!
//! Renders the top active auctions for the selected category as a header
//! plus one line per listing. Listings refresh on their own background loop;
//! the tick path only swaps in the latest shared list. Switching categories
//! redefines what every cached listing means, so a switch tears the loop
//! down, drops the list and restarts from scratch.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::constants::{
    AUCTION_REFRESH_MS, CURRENCY_SYMBOL, TEXT_AUCTION_HEADER, TEXT_LOADING, TEXT_NO_AUCTIONS,
    TEXT_SEPARATOR,
};
use crate::display::{ChangeDetector, RenderPanel};
use crate::format::{format_amount, item_display_name, time_remaining};
use crate::service::MarketService;
use crate::settings::{AuctionCategory, HudSettings};
use crate::types::AuctionListing;

type ListingSlot = Arc<RwLock<Option<Arc<Vec<AuctionListing>>>>>;

/// Everything that affects the rendered panel, compared tick-to-tick
///
/// Listings compare by identity: a refresh always installs a new list, and
/// comparing by pointer keeps remaining-time strings from re-rendering every
/// frame between refreshes.
#[derive(Clone)]
struct DisplayKey {
    listings: Option<Arc<Vec<AuctionListing>>>,
    display_count: usize,
    category: AuctionCategory,
}

impl PartialEq for DisplayKey {
    fn eq(&self, other: &Self) -> bool {
        self.display_count == other.display_count
            && self.category == other.category
            && match (&self.listings, &other.listings) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}

/// Engine behind the multi-line auction widget
pub struct AuctionWidget {
    service: Arc<MarketService>,
    settings: Arc<HudSettings>,
    listings: ListingSlot,
    detector: ChangeDetector<DisplayKey>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    last_category: Option<AuctionCategory>,
}

impl AuctionWidget {
    pub fn new(service: Arc<MarketService>, settings: Arc<HudSettings>) -> Self {
        Self {
            service,
            settings,
            listings: Arc::new(RwLock::new(None)),
            detector: ChangeDetector::new(),
            cancel: None,
            task: None,
            last_category: None,
        }
    }

    /// Host tick; `editor` is true on the settings preview screen
    pub fn on_tick(&mut self, panel: &mut dyn RenderPanel, editor: bool) {
        if editor {
            self.render_editor_preview(panel);
            return;
        }

        if !self.settings.enabled() {
            panel.hide_from(0);
            self.stop_refresh_task();
            self.detector.reset();
            return;
        }

        let category = self.settings.auction_category();
        if self.last_category != Some(category) {
            self.last_category = Some(category);
            self.stop_refresh_task();
            if let Ok(mut slot) = self.listings.write() {
                *slot = None;
            }
            self.detector.reset();
        }

        self.ensure_refresh_task(category);

        let current = self.listings.read().ok().and_then(|slot| slot.clone());
        let display_count = self.settings.auction_display_count();

        let key = DisplayKey {
            listings: current.clone(),
            display_count,
            category,
        };
        if self.detector.update(key) {
            render(panel, current.as_deref().map(Vec::as_slice), display_count);
        }
    }

    fn render_editor_preview(&self, panel: &mut dyn RenderPanel) {
        panel.set_line(0, TEXT_AUCTION_HEADER.to_string());
        panel.set_line(1, "Diamond - $1.000.000 - 2h 30m".to_string());
        panel.set_line(2, "Emerald - $500.000 - 1h 15m".to_string());
        panel.hide_from(3);
    }

    fn ensure_refresh_task(&mut self, category: AuctionCategory) {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let api = self.service.api();
        let slot = Arc::clone(&self.listings);
        let task_cancel = cancel.clone();

        let task = self.service.runtime().spawn(async move {
            let interval = Duration::from_millis(AUCTION_REFRESH_MS);
            loop {
                let listings = match api.fetch_auctions(category).await {
                    Ok(listings) => listings,
                    Err(err) => {
                        tracing::warn!(error = %err, ?category, "auction fetch failed");
                        Vec::new()
                    }
                };
                if let Ok(mut current) = slot.write() {
                    *current = Some(Arc::new(listings));
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

impl Drop for AuctionWidget {
    fn drop(&mut self) {
        self.stop_refresh_task();
    }
}

fn render(panel: &mut dyn RenderPanel, listings: Option<&[AuctionListing]>, display_count: usize) {
    let Some(listings) = listings else {
        panel.set_line(0, TEXT_LOADING.to_string());
        panel.hide_from(1);
        return;
    };

    panel.set_line(0, TEXT_AUCTION_HEADER.to_string());

    if listings.is_empty() {
        panel.set_line(1, TEXT_NO_AUCTIONS.to_string());
        panel.hide_from(2);
        return;
    }

    let shown = listings.len().min(display_count);
    let now = Utc::now();
    for (i, listing) in listings.iter().take(shown).enumerate() {
        panel.set_line(i + 1, format_listing(listing, now));
    }
    panel.hide_from(shown + 1);
}

/// One auction row: `Sharp Sword x3 - $1.000.000 - 2h 30m`
fn format_listing(listing: &AuctionListing, now: chrono::DateTime<Utc>) -> String {
    let mut name = match &listing.display_name {
        Some(display_name) if !display_name.is_empty() => display_name.clone(),
        _ => item_display_name(&listing.material),
    };
    if listing.amount > 1 {
        name.push_str(&format!(" x{}", listing.amount));
    }

    format!(
        "{}{}{}{}{}{}",
        name,
        TEXT_SEPARATOR,
        CURRENCY_SYMBOL,
        format_amount(listing.current_bid),
        TEXT_SEPARATOR,
        time_remaining(listing.end_time, now),
    )
}
