//! Single-item price widget engine
//!
//! Shows the market price of the item the player currently holds. The host
//! reports held-item changes through [`ItemPriceWidget::set_held_item`]; the
//! engine requests a background fetch for new keys and renders whatever the
//! cache holds on each tick.

use std::sync::Arc;

use crate::constants::{
    CURRENCY_SYMBOL, TEXT_LOADING, TEXT_NO_BUY_PRICE, TEXT_NO_ITEM, TEXT_NO_PRICE,
    TEXT_NO_SELL_PRICE, TEXT_SEPARATOR,
};
use crate::display::{ChangeDetector, RenderLine};
use crate::format::{format_amount, item_display_name};
use crate::service::MarketService;
use crate::settings::{DisplayMode, HudSettings};
use crate::types::{ItemStack, PriceRecord};

/// Everything that affects the rendered line, compared tick-to-tick
#[derive(Clone, PartialEq)]
struct DisplayKey {
    item: Option<ItemStack>,
    record: Option<PriceRecord>,
    mode: DisplayMode,
    show_item_name: bool,
    use_stack_size: bool,
    buy_color: u32,
    sell_color: u32,
}

/// Engine behind the held-item price line
pub struct ItemPriceWidget {
    service: Arc<MarketService>,
    settings: Arc<HudSettings>,
    detector: ChangeDetector<DisplayKey>,
    held: Option<ItemStack>,
}

impl ItemPriceWidget {
    pub fn new(service: Arc<MarketService>, settings: Arc<HudSettings>) -> Self {
        Self {
            service,
            settings,
            detector: ChangeDetector::new(),
            held: None,
        }
    }

    /// Host callback: the held item changed (or the hand is now empty)
    pub fn set_held_item(&mut self, item: Option<ItemStack>) {
        if self.held == item {
            return;
        }
        if let Some(stack) = &item {
            if self.service.is_running() {
                self.service.request_price(&stack.key);
            }
        }
        self.held = item;
    }

    /// Host tick; `editor` is true on the settings preview screen
    pub fn on_tick(&mut self, line: &mut dyn RenderLine, editor: bool) {
        if editor {
            line.set_text(TEXT_LOADING.to_string());
            line.set_visible(true);
            return;
        }

        if !self.settings.enabled() {
            line.set_visible(false);
            self.service.stop();
            self.detector.reset();
            return;
        }

        self.service.ensure_started();

        if let Some(stack) = &self.held {
            self.service.request_price(&stack.key);
        }

        let record = self
            .held
            .as_ref()
            .and_then(|stack| self.service.cached_price(&stack.key));

        let key = DisplayKey {
            item: self.held.clone(),
            record,
            mode: self.settings.display_mode(),
            show_item_name: self.settings.show_item_name(),
            use_stack_size: self.settings.use_stack_size(),
            buy_color: self.settings.buy_color().packed(),
            sell_color: self.settings.sell_color().packed(),
        };

        if self.detector.update(key) {
            let text = self.build_text(record);
            line.set_text(text);
            line.set_visible(true);
        }
    }

    fn build_text(&self, record: Option<PriceRecord>) -> String {
        let Some(stack) = &self.held else {
            return TEXT_NO_ITEM.to_string();
        };
        let Some(record) = record else {
            return TEXT_LOADING.to_string();
        };
        if !record.found {
            return TEXT_NO_PRICE.to_string();
        }

        let use_stack_size = self.settings.use_stack_size();
        let multiplier = if use_stack_size { stack.stack_size } else { 1 };
        let price_text = price_text(&record, self.settings.display_mode(), multiplier);

        if !self.settings.show_item_name() {
            return price_text;
        }

        let mut name = item_display_name(stack.key.as_str());
        if use_stack_size && stack.stack_size > 1 {
            name.push_str(&format!(" ({})", stack.stack_size));
        }
        format!("{}{}{}", name, TEXT_SEPARATOR, price_text)
    }
}

fn side_text(price: Option<f64>, multiplier: u32, missing: &str) -> String {
    match price {
        Some(price) if price > 0.0 => format!(
            "{}{}",
            CURRENCY_SYMBOL,
            format_amount(price * multiplier as f64)
        ),
        _ => missing.to_string(),
    }
}

fn price_text(record: &PriceRecord, mode: DisplayMode, multiplier: u32) -> String {
    match mode {
        DisplayMode::Buy => side_text(record.buy_price, multiplier, TEXT_NO_BUY_PRICE),
        DisplayMode::Sell => side_text(record.sell_price, multiplier, TEXT_NO_SELL_PRICE),
        DisplayMode::Both => format!(
            "{}{}{}",
            side_text(record.buy_price, multiplier, TEXT_NO_BUY_PRICE),
            TEXT_SEPARATOR,
            side_text(record.sell_price, multiplier, TEXT_NO_SELL_PRICE),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockApi;
    use crate::types::ItemKey;
    use tokio::runtime::Handle;

    #[derive(Default)]
    struct FakeLine {
        text: Option<String>,
        visible: Option<bool>,
        pushes: usize,
    }

    impl RenderLine for FakeLine {
        fn set_text(&mut self, text: String) {
            self.text = Some(text);
            self.pushes += 1;
        }

        fn set_visible(&mut self, visible: bool) {
            self.visible = Some(visible);
        }
    }

    fn buy_only(price: f64) -> PriceRecord {
        PriceRecord {
            found: true,
            buy_price: Some(price),
            sell_price: None,
        }
    }

    struct Fixture {
        api: Arc<MockApi>,
        service: Arc<MarketService>,
        settings: Arc<HudSettings>,
        widget: ItemPriceWidget,
        line: FakeLine,
    }

    fn fixture() -> Fixture {
        let api = Arc::new(MockApi::new());
        let service = Arc::new(MarketService::new(api.clone(), Handle::current()));
        let settings = Arc::new(HudSettings::new());
        let widget = ItemPriceWidget::new(service.clone(), settings.clone());
        Fixture {
            api,
            service,
            settings,
            widget,
            line: FakeLine::default(),
        }
    }

    #[tokio::test]
    async fn shows_loading_before_any_fetch() {
        let mut f = fixture();
        f.widget.set_held_item(Some(ItemStack::new("DIAMOND", 1)));
        f.widget.on_tick(&mut f.line, false);
        assert_eq!(f.line.text.as_deref(), Some(TEXT_LOADING));
        f.service.stop();
    }

    #[tokio::test]
    async fn buy_mode_shows_the_buy_price() {
        let mut f = fixture();
        let key = ItemKey::new("DIAMOND");
        f.api.set_price(key.clone(), buy_only(100.0));
        f.service.refresh_price_now(&key).await;

        f.settings.set_display_mode(DisplayMode::Buy);
        f.settings.set_show_item_name(false);
        f.widget.set_held_item(Some(ItemStack::new("DIAMOND", 1)));
        f.widget.on_tick(&mut f.line, false);

        assert_eq!(f.line.text.as_deref(), Some("$100"));
        f.service.stop();
    }

    #[tokio::test]
    async fn sell_mode_without_a_sell_side_shows_the_fallback() {
        let mut f = fixture();
        let key = ItemKey::new("DIAMOND");
        f.api.set_price(key.clone(), buy_only(100.0));
        f.service.refresh_price_now(&key).await;

        f.settings.set_display_mode(DisplayMode::Sell);
        f.settings.set_show_item_name(false);
        f.widget.set_held_item(Some(ItemStack::new("DIAMOND", 1)));
        f.widget.on_tick(&mut f.line, false);

        assert_eq!(f.line.text.as_deref(), Some(TEXT_NO_SELL_PRICE));
        f.service.stop();
    }

    #[tokio::test]
    async fn not_found_shows_no_price_in_every_mode() {
        let mut f = fixture();
        let key = ItemKey::new("UNLISTED");
        // Unscripted key: the mock answers 404, cached as not-found.
        f.service.refresh_price_now(&key).await;

        f.widget.set_held_item(Some(ItemStack::new("UNLISTED", 1)));
        for mode in [DisplayMode::Buy, DisplayMode::Sell, DisplayMode::Both] {
            f.settings.set_display_mode(mode);
            f.widget.on_tick(&mut f.line, false);
            assert_eq!(f.line.text.as_deref(), Some(TEXT_NO_PRICE));
        }
        f.service.stop();
    }

    #[tokio::test]
    async fn stack_size_multiplies_and_annotates_the_name() {
        let mut f = fixture();
        let key = ItemKey::new("DIAMOND");
        f.api.set_price(key.clone(), buy_only(100.0));
        f.service.refresh_price_now(&key).await;

        f.settings.set_display_mode(DisplayMode::Buy);
        f.widget.set_held_item(Some(ItemStack::new("DIAMOND", 64)));
        f.widget.on_tick(&mut f.line, false);

        assert_eq!(f.line.text.as_deref(), Some("Diamond (64) - $6.400"));
        f.service.stop();
    }

    #[tokio::test]
    async fn unchanged_state_renders_exactly_once() {
        let mut f = fixture();
        let key = ItemKey::new("DIAMOND");
        f.api.set_price(key.clone(), buy_only(100.0));
        f.service.refresh_price_now(&key).await;

        f.widget.set_held_item(Some(ItemStack::new("DIAMOND", 1)));
        f.widget.on_tick(&mut f.line, false);
        f.widget.on_tick(&mut f.line, false);
        assert_eq!(f.line.pushes, 1);

        // Any config flag flip re-renders.
        f.settings.set_show_item_name(!f.settings.show_item_name());
        f.widget.on_tick(&mut f.line, false);
        assert_eq!(f.line.pushes, 2);
        f.service.stop();
    }

    #[tokio::test]
    async fn empty_hand_shows_no_item() {
        let mut f = fixture();
        f.widget.on_tick(&mut f.line, false);
        assert_eq!(f.line.text.as_deref(), Some(TEXT_NO_ITEM));
        f.service.stop();
    }

    #[tokio::test]
    async fn disabling_hides_the_line_and_stops_the_service() {
        let mut f = fixture();
        f.widget.on_tick(&mut f.line, false);
        assert!(f.service.is_running());

        f.settings.set_enabled(false);
        f.widget.on_tick(&mut f.line, false);
        assert_eq!(f.line.visible, Some(false));
        assert!(!f.service.is_running());
    }
}
