//! Provider abstraction for fetching market data from the remote API

use crate::{
    error::FetchError,
    settings::AuctionCategory,
    types::{AuctionListing, ItemKey, MarketSnapshot, PriceRecord},
};
use async_trait::async_trait;

/// Trait over the remote market API
///
/// The engine only ever talks to the network through this seam, which keeps
/// the caches and schedulers testable with a scripted mock.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Fetches the current price record for a single item
    ///
    /// A 404 from the API surfaces as [`FetchError::NotFound`]; the caller
    /// decides whether that becomes a negative cache entry.
    async fn fetch_item_price(&self, key: &ItemKey) -> Result<PriceRecord, FetchError>;

    /// Fetches the bulk snapshot covering every category
    async fn fetch_snapshot(&self) -> Result<MarketSnapshot, FetchError>;

    /// Fetches the active auctions for a category
    async fn fetch_auctions(
        &self,
        category: AuctionCategory,
    ) -> Result<Vec<AuctionListing>, FetchError>;

    /// Fetches the all-time player-count record
    async fn fetch_player_record(&self) -> Result<u64, FetchError>;

    /// Returns the name of this provider
    fn name(&self) -> &'static str;
}
