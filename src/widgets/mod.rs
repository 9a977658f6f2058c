//! HUD widget engines built on the market service
//!
//! Each engine owns the per-tick flow for one host widget: read cached data,
//! fold data and settings into a composite display key, and push formatted
//! text only when the key changed. The host drives `on_tick` every frame and
//! supplies item/inventory state; the engines never touch the host API
//! directly.

pub mod auction;
pub mod inventory_value;
pub mod item_price;
pub mod record;

pub use auction::AuctionWidget;
pub use inventory_value::InventoryValueWidget;
pub use item_price::ItemPriceWidget;
pub use record::RecordWidget;
