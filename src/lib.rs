//! # Market HUD Engine
//!
//! Cache-and-refresh engine behind a set of market-price HUD overlay
//! widgets. The host framework owns the render loop, input and settings UI;
//! this crate owns everything between the remote market API and the text
//! lines the host draws: TTL caches, request coalescing, scheduled bulk
//! refreshes and render change detection.
//!
//! ## Usage
//!
//! One [`MarketService`] per widget context bundles the caches and the
//! background refresh scheduler; the widget engines drive it from the host
//! tick:
//!
//! ```no_run
//! use std::sync::Arc;
//! use market_hud::{HttpMarketApi, HudSettings, ItemPriceWidget, MarketService};
//!
//! # fn example(runtime: tokio::runtime::Handle) -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpMarketApi::new()?);
//! let service = Arc::new(MarketService::new(api, runtime));
//! let settings = Arc::new(HudSettings::new());
//! let mut widget = ItemPriceWidget::new(service, settings);
//! // Call widget.on_tick(&mut line, editor) from the host's frame callback.
//! # Ok(())
//! # }
//! ```
//!
//! Every method reachable from the tick path is non-blocking: cache misses
//! render as a loading state and the data arrives on a later frame.

pub mod cache;
pub mod constants;
pub mod display;
pub mod error;
pub mod format;
pub mod inflight;
pub mod provider;
pub mod providers;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod snapshot;
pub mod types;
pub mod widgets;

// Re-export commonly used types
pub use display::{ChangeDetector, RenderLine, RenderPanel};
pub use error::FetchError;
pub use provider::MarketApi;
pub use providers::HttpMarketApi;
pub use service::MarketService;
pub use settings::{AuctionCategory, Color, DisplayMode, HudSettings};
pub use types::{
    AggregateValue, AuctionListing, ItemKey, ItemStack, MarketSnapshot, PriceRecord,
};
pub use widgets::{AuctionWidget, InventoryValueWidget, ItemPriceWidget, RecordWidget};
