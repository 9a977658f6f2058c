//! Inventory aggregate-value widget engine
//!
//! Values the whole inventory against the market. Slots resolve through the
//! price cache with the bulk snapshot as fallback, so a full recomputation
//! is pure map reads and safe to run on the tick thread; it is throttled to
//! once every couple of seconds regardless.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::constants::{
    CURRENCY_SYMBOL, INVENTORY_RECOMPUTE_MS, TEXT_CALCULATING, TEXT_ITEMS, TEXT_LOADING,
    TEXT_NO_BUY_PRICE, TEXT_NO_ITEM, TEXT_NO_PRICE, TEXT_NO_SELL_PRICE, TEXT_SEPARATOR,
};
use crate::display::{ChangeDetector, RenderLine};
use crate::format::format_amount;
use crate::service::MarketService;
use crate::settings::{DisplayMode, HudSettings};
use crate::types::{AggregateValue, ItemStack};

/// Everything that affects the rendered line, compared tick-to-tick
#[derive(Clone, PartialEq)]
struct DisplayKey {
    value: Option<AggregateValue>,
    has_snapshot: bool,
    mode: DisplayMode,
    show_item_count: bool,
    buy_color: u32,
    sell_color: u32,
}

/// Engine behind the inventory value line
pub struct InventoryValueWidget {
    service: Arc<MarketService>,
    settings: Arc<HudSettings>,
    detector: ChangeDetector<DisplayKey>,
    current: Option<AggregateValue>,
    last_compute: Option<Instant>,
}

impl InventoryValueWidget {
    pub fn new(service: Arc<MarketService>, settings: Arc<HudSettings>) -> Self {
        Self {
            service,
            settings,
            detector: ChangeDetector::new(),
            current: None,
            last_compute: None,
        }
    }

    /// Host tick with the current inventory contents
    pub fn on_tick(&mut self, line: &mut dyn RenderLine, slots: &[ItemStack], editor: bool) {
        if editor {
            line.set_text(TEXT_LOADING.to_string());
            line.set_visible(true);
            return;
        }

        if !self.settings.enabled() {
            line.set_visible(false);
            self.service.stop();
            self.detector.reset();
            self.current = None;
            self.last_compute = None;
            return;
        }

        self.service.ensure_started();

        let now = Instant::now();
        let due = self
            .last_compute
            .map(|at| now.saturating_duration_since(at) > Duration::from_millis(INVENTORY_RECOMPUTE_MS))
            .unwrap_or(true);
        if due {
            self.last_compute = Some(now);
            self.current = Some(aggregate_value(&self.service, slots));
        }

        let key = DisplayKey {
            value: self.current,
            has_snapshot: self.service.current_snapshot().is_some(),
            mode: self.settings.display_mode(),
            show_item_count: self.settings.show_item_count(),
            buy_color: self.settings.buy_color().packed(),
            sell_color: self.settings.sell_color().packed(),
        };

        if self.detector.update(key) {
            let text = self.build_text();
            line.set_text(text);
            line.set_visible(true);
        }
    }

    fn build_text(&self) -> String {
        if self.service.current_snapshot().is_none() {
            return TEXT_LOADING.to_string();
        }
        let Some(value) = self.current else {
            return TEXT_CALCULATING.to_string();
        };
        if value.total_items == 0 {
            return TEXT_NO_ITEM.to_string();
        }
        if !value.complete {
            return TEXT_CALCULATING.to_string();
        }

        let value_text = value_text(&value, self.settings.display_mode());
        if self.settings.show_item_count() {
            format!(
                "{} {}{}{}",
                value.total_items, TEXT_ITEMS, TEXT_SEPARATOR, value_text
            )
        } else {
            value_text
        }
    }
}

fn total_text(total: f64, missing: &str) -> String {
    if total > 0.0 {
        format!("{}{}", CURRENCY_SYMBOL, format_amount(total))
    } else {
        missing.to_string()
    }
}

fn value_text(value: &AggregateValue, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Buy => total_text(value.total_buy_value, TEXT_NO_BUY_PRICE),
        DisplayMode::Sell => total_text(value.total_sell_value, TEXT_NO_SELL_PRICE),
        DisplayMode::Both => format!(
            "{}{}{}",
            total_text(value.total_buy_value, TEXT_NO_PRICE),
            TEXT_SEPARATOR,
            total_text(value.total_sell_value, TEXT_NO_PRICE),
        ),
    }
}

/// Values every slot against the market
///
/// Slots that cannot be priced because no market data is available yet mark
/// the result incomplete; confirmed not-found items count toward the item
/// total but contribute no value.
pub fn aggregate_value(service: &MarketService, slots: &[ItemStack]) -> AggregateValue {
    let mut result = AggregateValue::empty();

    for slot in slots {
        result.total_items += slot.stack_size;
        match service.resolve_price(&slot.key) {
            Some(record) if record.found => {
                let count = slot.stack_size as f64;
                if let Some(buy) = record.buy_price {
                    result.total_buy_value += buy * count;
                }
                if let Some(sell) = record.sell_price {
                    result.total_sell_value += sell * count;
                }
            }
            Some(_) => {}
            None => result.complete = false,
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockApi;
    use crate::types::{MarketSnapshot, Order, OrderSide};
    use std::collections::HashMap;
    use tokio::runtime::Handle;

    #[derive(Default)]
    struct FakeLine {
        text: Option<String>,
        visible: Option<bool>,
    }

    impl RenderLine for FakeLine {
        fn set_text(&mut self, text: String) {
            self.text = Some(text);
        }

        fn set_visible(&mut self, visible: bool) {
            self.visible = Some(visible);
        }
    }

    fn snapshot_with_buys(items: &[(&str, f64)]) -> MarketSnapshot {
        let mut category = HashMap::new();
        for (item, buy) in items {
            category.insert(
                item.to_string(),
                vec![Order {
                    order_side: OrderSide::Buy,
                    price: *buy,
                }],
            );
        }
        let mut categories = HashMap::new();
        categories.insert("ORES".to_string(), category);
        MarketSnapshot::new(categories)
    }

    #[tokio::test]
    async fn aggregates_buy_values_across_slots() {
        let api = Arc::new(MockApi::new());
        api.set_snapshot(snapshot_with_buys(&[("DIAMOND", 100.0), ("EMERALD", 50.0)]));
        let service = MarketService::new(api, Handle::current());
        service.refresh_snapshot_now().await;

        let slots = [ItemStack::new("DIAMOND", 10), ItemStack::new("EMERALD", 5)];
        let value = aggregate_value(&service, &slots);

        assert_eq!(value.total_items, 15);
        assert_eq!(value.total_buy_value, 1250.0);
        assert_eq!(value.total_sell_value, 0.0);
        assert!(value.complete);
    }

    #[tokio::test]
    async fn missing_market_data_marks_the_result_incomplete() {
        let api = Arc::new(MockApi::new());
        let service = MarketService::new(api, Handle::current());

        let slots = [ItemStack::new("DIAMOND", 10)];
        let value = aggregate_value(&service, &slots);

        assert_eq!(value.total_items, 10);
        assert!(!value.complete);
    }

    #[tokio::test]
    async fn not_found_items_count_but_contribute_nothing() {
        let api = Arc::new(MockApi::new());
        api.set_snapshot(snapshot_with_buys(&[("DIAMOND", 100.0)]));
        let service = MarketService::new(api, Handle::current());
        service.refresh_snapshot_now().await;

        let slots = [ItemStack::new("DIAMOND", 2), ItemStack::new("BEDROCK", 3)];
        let value = aggregate_value(&service, &slots);

        assert_eq!(value.total_items, 5);
        assert_eq!(value.total_buy_value, 200.0);
        assert!(value.complete);
    }

    #[tokio::test]
    async fn renders_the_item_count_and_buy_total() {
        let api = Arc::new(MockApi::new());
        api.set_snapshot(snapshot_with_buys(&[("DIAMOND", 100.0)]));
        let service = Arc::new(MarketService::new(api, Handle::current()));
        service.refresh_snapshot_now().await;

        let settings = Arc::new(HudSettings::new());
        settings.set_display_mode(DisplayMode::Buy);
        let mut widget = InventoryValueWidget::new(service.clone(), settings);
        let mut line = FakeLine::default();

        widget.on_tick(&mut line, &[ItemStack::new("DIAMOND", 15)], false);
        assert_eq!(line.text.as_deref(), Some("15 items - $1.500"));
        service.stop();
    }

    #[tokio::test]
    async fn shows_loading_until_the_snapshot_arrives() {
        let api = Arc::new(MockApi::new());
        let service = Arc::new(MarketService::new(api, Handle::current()));
        let settings = Arc::new(HudSettings::new());
        let mut widget = InventoryValueWidget::new(service.clone(), settings);
        let mut line = FakeLine::default();

        widget.on_tick(&mut line, &[ItemStack::new("DIAMOND", 1)], false);
        assert_eq!(line.text.as_deref(), Some(TEXT_LOADING));
        service.stop();
    }

    #[tokio::test]
    async fn empty_inventory_shows_no_item() {
        let api = Arc::new(MockApi::new());
        api.set_snapshot(snapshot_with_buys(&[]));
        let service = Arc::new(MarketService::new(api, Handle::current()));
        service.refresh_snapshot_now().await;

        let settings = Arc::new(HudSettings::new());
        let mut widget = InventoryValueWidget::new(service.clone(), settings);
        let mut line = FakeLine::default();

        widget.on_tick(&mut line, &[], false);
        assert_eq!(line.text.as_deref(), Some(TEXT_NO_ITEM));
        service.stop();
    }
}
