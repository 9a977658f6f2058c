//! Live-reloadable HUD settings
//!
//! The host's configuration UI mutates these at any time from any thread
//! while the tick loop reads them every frame, so every field is an atomic.
//! Each read is an independent relaxed load; torn multi-field reads are
//! harmless because the change detector folds the values into the composite
//! display key anyway.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Which price side(s) a widget displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DisplayMode {
    Buy = 0,
    Sell = 1,
    Both = 2,
}

impl DisplayMode {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DisplayMode::Buy,
            1 => DisplayMode::Sell,
            _ => DisplayMode::Both,
        }
    }
}

/// Auction category selector; `Top` maps to the global active-auction feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuctionCategory {
    Top = 0,
    Tools = 1,
    Weapons = 2,
    Armor = 3,
    Blocks = 4,
    Food = 5,
    Misc = 6,
}

impl AuctionCategory {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => AuctionCategory::Tools,
            2 => AuctionCategory::Weapons,
            3 => AuctionCategory::Armor,
            4 => AuctionCategory::Blocks,
            5 => AuctionCategory::Food,
            6 => AuctionCategory::Misc,
            _ => AuctionCategory::Top,
        }
    }

    /// Path segment used by the category endpoint; `None` for the top feed
    pub fn api_value(&self) -> Option<&'static str> {
        match self {
            AuctionCategory::Top => None,
            AuctionCategory::Tools => Some("tools"),
            AuctionCategory::Weapons => Some("weapons"),
            AuctionCategory::Armor => Some("armor"),
            AuctionCategory::Blocks => Some("blocks"),
            AuctionCategory::Food => Some("food"),
            AuctionCategory::Misc => Some("misc"),
        }
    }
}

/// An RGB color as picked in the host's settings UI, packed for atomic storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    fn from_packed(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }
}

/// Shared settings store for all widgets
pub struct HudSettings {
    enabled: AtomicBool,
    display_mode: AtomicU8,
    show_item_name: AtomicBool,
    show_item_count: AtomicBool,
    use_stack_size: AtomicBool,
    buy_color: AtomicU32,
    sell_color: AtomicU32,
    auction_category: AtomicU8,
    auction_display_count: AtomicU8,
}

impl HudSettings {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            display_mode: AtomicU8::new(DisplayMode::Both as u8),
            show_item_name: AtomicBool::new(true),
            show_item_count: AtomicBool::new(true),
            use_stack_size: AtomicBool::new(true),
            buy_color: AtomicU32::new(Color::rgb(85, 255, 255).packed()),
            sell_color: AtomicU32::new(Color::rgb(255, 0, 0).packed()),
            auction_category: AtomicU8::new(AuctionCategory::Top as u8),
            auction_display_count: AtomicU8::new(5),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_u8(self.display_mode.load(Ordering::Relaxed))
    }

    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.display_mode.store(mode as u8, Ordering::Relaxed);
    }

    pub fn show_item_name(&self) -> bool {
        self.show_item_name.load(Ordering::Relaxed)
    }

    pub fn set_show_item_name(&self, show: bool) {
        self.show_item_name.store(show, Ordering::Relaxed);
    }

    pub fn show_item_count(&self) -> bool {
        self.show_item_count.load(Ordering::Relaxed)
    }

    pub fn set_show_item_count(&self, show: bool) {
        self.show_item_count.store(show, Ordering::Relaxed);
    }

    pub fn use_stack_size(&self) -> bool {
        self.use_stack_size.load(Ordering::Relaxed)
    }

    pub fn set_use_stack_size(&self, use_stack_size: bool) {
        self.use_stack_size.store(use_stack_size, Ordering::Relaxed);
    }

    pub fn buy_color(&self) -> Color {
        Color::from_packed(self.buy_color.load(Ordering::Relaxed))
    }

    pub fn set_buy_color(&self, color: Color) {
        self.buy_color.store(color.packed(), Ordering::Relaxed);
    }

    pub fn sell_color(&self) -> Color {
        Color::from_packed(self.sell_color.load(Ordering::Relaxed))
    }

    pub fn set_sell_color(&self, color: Color) {
        self.sell_color.store(color.packed(), Ordering::Relaxed);
    }

    pub fn auction_category(&self) -> AuctionCategory {
        AuctionCategory::from_u8(self.auction_category.load(Ordering::Relaxed))
    }

    pub fn set_auction_category(&self, category: AuctionCategory) {
        self.auction_category.store(category as u8, Ordering::Relaxed);
    }

    pub fn auction_display_count(&self) -> usize {
        self.auction_display_count.load(Ordering::Relaxed) as usize
    }

    pub fn set_auction_display_count(&self, count: u8) {
        self.auction_display_count.store(count, Ordering::Relaxed);
    }
}

impl Default for HudSettings {
    fn default() -> Self {
        Self::new()
    }
}
