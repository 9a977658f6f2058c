//! Types for the market HUD engine

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized market item identifier
///
/// Keys are uppercased exactly once at construction so that every cache map
/// in the engine indexes the same spelling. A mixed-case key that slips past
/// normalization would silently miss on every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey(String);

impl ItemKey {
    /// Creates a key from any spelling of an item identifier
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// The normalized identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side of a market order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// A single listing as returned by the market API
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_side: OrderSide,
    pub price: f64,
}

/// Resolved price state for one item key
///
/// Three shapes are valid: confirmed not-found (`found == false`), found with
/// both sides, and found with one side missing - a market can carry only bids
/// or only asks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    /// False when the API confirmed the item has no listings
    pub found: bool,
    pub buy_price: Option<f64>,
    pub sell_price: Option<f64>,
}

impl PriceRecord {
    /// Record for an item the API confirmed has no listings
    pub fn not_found() -> Self {
        Self {
            found: false,
            buy_price: None,
            sell_price: None,
        }
    }

    /// Builds a record from an order array; an empty array means not-found
    pub fn from_orders(orders: &[Order]) -> Self {
        if orders.is_empty() {
            return Self::not_found();
        }

        let mut buy_price = None;
        let mut sell_price = None;
        for order in orders {
            match order.order_side {
                OrderSide::Buy => buy_price = Some(order.price),
                OrderSide::Sell => sell_price = Some(order.price),
            }
        }

        Self {
            found: true,
            buy_price,
            sell_price,
        }
    }
}

/// A single bulk document of listings for all tracked categories
///
/// Replaced wholesale on every refresh, never patched in place.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    /// category name -> item id -> orders
    pub categories: HashMap<String, HashMap<String, Vec<Order>>>,
    pub fetched_at: Instant,
}

impl MarketSnapshot {
    pub fn new(categories: HashMap<String, HashMap<String, Vec<Order>>>) -> Self {
        Self {
            categories,
            fetched_at: Instant::now(),
        }
    }

    /// Looks up an item by scanning every category
    ///
    /// The first category containing the key wins; item ids are assumed
    /// unique per category by API contract, so no merging takes place.
    /// Absent from all categories yields a not-found record. The linear scan
    /// is fine at the API's category count (at most a handful) and lookups
    /// are amortized by the price cache anyway.
    pub fn find_item(&self, key: &ItemKey) -> PriceRecord {
        for items in self.categories.values() {
            if let Some(orders) = items.get(key.as_str()) {
                return PriceRecord::from_orders(orders);
            }
        }
        PriceRecord::not_found()
    }
}

/// Result of valuing a set of inventory slots against the market
///
/// `complete == false` means the scan could not price every slot (market
/// data was unavailable mid-scan) and the display layer must not treat the
/// totals as final.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateValue {
    pub total_items: u32,
    pub total_buy_value: f64,
    pub total_sell_value: f64,
    pub complete: bool,
}

impl AggregateValue {
    pub fn empty() -> Self {
        Self {
            total_items: 0,
            total_buy_value: 0.0,
            total_sell_value: 0.0,
            complete: true,
        }
    }
}

/// One active auction as shown in the auction widget
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionListing {
    pub material: String,
    pub amount: u32,
    pub display_name: Option<String>,
    pub current_bid: f64,
    pub end_time: DateTime<Utc>,
}

/// An item stack the host reports from the player's hand or inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub key: ItemKey,
    pub stack_size: u32,
}

impl ItemStack {
    pub fn new(raw_id: &str, stack_size: u32) -> Self {
        Self {
            key: ItemKey::new(raw_id),
            stack_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_key_normalizes_case() {
        assert_eq!(ItemKey::new("diamond_sword").as_str(), "DIAMOND_SWORD");
        assert_eq!(ItemKey::new(" Diamond "), ItemKey::new("DIAMOND"));
    }

    #[test]
    fn order_wire_format_round_trips() {
        let order: Order = serde_json::from_str(r#"{"orderSide":"BUY","price":100.0}"#).unwrap();
        assert_eq!(order.order_side, OrderSide::Buy);
        assert_eq!(order.price, 100.0);
    }

    #[test]
    fn record_from_buy_only_orders() {
        let orders = [Order {
            order_side: OrderSide::Buy,
            price: 100.0,
        }];
        let record = PriceRecord::from_orders(&orders);
        assert!(record.found);
        assert_eq!(record.buy_price, Some(100.0));
        assert_eq!(record.sell_price, None);
    }

    #[test]
    fn record_from_empty_orders_is_not_found() {
        let record = PriceRecord::from_orders(&[]);
        assert!(!record.found);
        assert_eq!(record.buy_price, None);
        assert_eq!(record.sell_price, None);
    }

    fn snapshot_with(category: &str, item: &str, orders: Vec<Order>) -> MarketSnapshot {
        let mut items = HashMap::new();
        items.insert(item.to_string(), orders);
        let mut categories = HashMap::new();
        categories.insert(category.to_string(), items);
        MarketSnapshot::new(categories)
    }

    #[test]
    fn snapshot_finds_item_in_single_category() {
        let snapshot = snapshot_with(
            "ORES",
            "DIAMOND",
            vec![
                Order {
                    order_side: OrderSide::Buy,
                    price: 100.0,
                },
                Order {
                    order_side: OrderSide::Sell,
                    price: 90.0,
                },
            ],
        );
        let record = snapshot.find_item(&ItemKey::new("diamond"));
        assert!(record.found);
        assert_eq!(record.buy_price, Some(100.0));
        assert_eq!(record.sell_price, Some(90.0));
    }

    #[test]
    fn snapshot_misses_yield_not_found() {
        let snapshot = snapshot_with("ORES", "DIAMOND", vec![]);
        let record = snapshot.find_item(&ItemKey::new("EMERALD"));
        assert!(!record.found);
    }
}
