//! Constants for the market HUD engine
//!
//! All cadences and thresholds for the cache-and-refresh engine are
//! centralized here. The engine carries no runtime configuration file -
//! user-facing behavior is controlled through [`crate::settings`] instead.

/// How long a cached per-item price stays fresh (in milliseconds)
pub const PRICE_TTL_MS: u64 = 30_000;

/// How long the bulk market snapshot stays fresh (in milliseconds)
pub const SNAPSHOT_TTL_MS: u64 = 30_000;

/// How often the background sweep evicts dead cache entries (in milliseconds)
pub const SWEEP_INTERVAL_MS: u64 = 300_000;

/// Entries older than `PRICE_TTL_MS * SWEEP_AGE_FACTOR` are reclaimed by the sweep
pub const SWEEP_AGE_FACTOR: u32 = 2;

/// How often active auction listings are refreshed (in milliseconds)
pub const AUCTION_REFRESH_MS: u64 = 15_000;

/// How often the inventory aggregate value is recomputed (in milliseconds)
pub const INVENTORY_RECOMPUTE_MS: u64 = 2_000;

/// How often the player-count record is refreshed (in milliseconds)
pub const RECORD_REFRESH_MS: u64 = 60_000;

/// HTTP request timeout when fetching market data (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Market API base URL
pub const MARKET_API_URL: &str = "https://api.opsucht.net";

/// Player-count record endpoint; served from a different host than the
/// market API
pub const RECORD_API_URL: &str = "https://craftportal.net/api/opsucht-record";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-hud/0.1.0";

/// Currency symbol prefixed to every formatted price
pub const CURRENCY_SYMBOL: &str = "$";

/// Displayed while a price has never been fetched
pub const TEXT_LOADING: &str = "Loading...";

/// Displayed while the aggregate value scan has not finished
pub const TEXT_CALCULATING: &str = "Calculating...";

/// Displayed when the API confirmed an item has no listings
pub const TEXT_NO_PRICE: &str = "No price";

/// Displayed when an item has no buy-side listing
pub const TEXT_NO_BUY_PRICE: &str = "No buy price";

/// Displayed when an item has no sell-side listing
pub const TEXT_NO_SELL_PRICE: &str = "No sell price";

/// Displayed when nothing is held / the inventory is empty
pub const TEXT_NO_ITEM: &str = "No item";

/// Displayed when no auctions are active in the selected category
pub const TEXT_NO_AUCTIONS: &str = "No auctions";

/// Header line of the auction widget
pub const TEXT_AUCTION_HEADER: &str = "Auction House";

/// Unit label after the inventory item count
pub const TEXT_ITEMS: &str = "items";

/// Separator between display segments ("name - price - time")
pub const TEXT_SEPARATOR: &str = " - ";
