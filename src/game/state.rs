//! Merge Creatures game state definitions.

use ratzilla::ratatui::style::Color;

/// Grid dimensions: 3 columns × 4 rows, indexed 0..12 row-major.
pub const GRID_COLS: usize = 3;
pub const GRID_ROWS: usize = 4;
pub const GRID_SIZE: usize = GRID_COLS * GRID_ROWS;

/// Unlock prices for the bottom row (indices 9, 10, 11).
pub const UNLOCK_PRICES: [f64; 3] = [5_000.0, 15_000.0, 30_000.0];

/// Cost of the auto-merge power-up, in coins.
pub const AUTO_MERGE_PRICE: f64 = 50_000.0;

/// How long a purchased auto-merge lasts (ms).
pub const AUTO_MERGE_DURATION_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Offline earnings accrue for at most 30 minutes.
pub const MAX_OFFLINE_MS: f64 = 30.0 * 60.0 * 1000.0;

/// Absences of 6 hours or more unlock the "double" option.
pub const DOUBLE_THRESHOLD_MS: f64 = 6.0 * 60.0 * 60.0 * 1000.0;

/// One grid slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell {
    Empty,
    /// A mergeable creature of the given tier (≥ 1, unbounded).
    Item { level: u32 },
    /// Slot purchasable for `price` coins.
    Locked { price: f64 },
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_item(&self) -> bool {
        matches!(self, Cell::Item { .. })
    }

    /// Item level, if this cell holds an item.
    pub fn level(&self) -> Option<u32> {
        match self {
            Cell::Item { level } => Some(*level),
            _ => None,
        }
    }
}

/// A single spawn waiting for a free slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedItem {
    pub level: u32,
}

/// One-time prompt offering accrued idle earnings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfflinePopup {
    pub coins: f64,
    pub can_double: bool,
}

/// The single source of truth for the game.
#[derive(Debug)]
pub struct GameState {
    /// Fixed 12-cell grid. Indices 0..9 start empty; 9, 10, 11 start locked.
    pub grid: [Cell; GRID_SIZE],
    /// Coins, fractional amounts allowed.
    pub coins: f64,
    /// Derived cache: always `economy::calculate_income(grid)`.
    /// Recomputed on every grid mutation, never trusted from storage.
    pub income_per_second: f64,
    /// Timestamp (ms since epoch) of the last offline reconciliation.
    pub last_updated_at: f64,
    /// At most one pending spawn, held while the grid is full.
    pub queue: Option<QueuedItem>,
    pub auto_merge_enabled: bool,
    /// Set whenever `auto_merge_enabled` is true; cleared together on expiry.
    pub auto_merge_expires_at: Option<f64>,
    /// Transient prompt, cleared once collected. Never persisted.
    pub offline_popup: Option<OfflinePopup>,
}

impl GameState {
    pub fn new(now_ms: f64) -> Self {
        let mut grid = [Cell::Empty; GRID_SIZE];
        for (i, price) in UNLOCK_PRICES.iter().enumerate() {
            grid[GRID_SIZE - UNLOCK_PRICES.len() + i] = Cell::Locked { price: *price };
        }
        Self {
            grid,
            coins: 0.0,
            income_per_second: 0.0,
            last_updated_at: now_ms,
            queue: None,
            auto_merge_enabled: false,
            auto_merge_expires_at: None,
            offline_popup: None,
        }
    }
}

/// Tier color, from the original creature palette. Tiers past 12 reuse the
/// last color.
pub fn level_color(level: u32) -> Color {
    match level {
        1 => Color::Rgb(0xff, 0xe0, 0x66),
        2 => Color::Rgb(0xfa, 0xb6, 0x66),
        3 => Color::Rgb(0xf6, 0x8f, 0x6a),
        4 => Color::Rgb(0xf0, 0x6d, 0x6d),
        5 => Color::Rgb(0xd6, 0x5d, 0xb1),
        6 => Color::Rgb(0x84, 0x5e, 0xc2),
        7 => Color::Rgb(0x4b, 0x7b, 0xec),
        8 => Color::Rgb(0x2d, 0x98, 0xda),
        9 => Color::Rgb(0x20, 0xbf, 0x6b),
        10 => Color::Rgb(0x26, 0xde, 0x81),
        11 => Color::Rgb(0x1d, 0xd1, 0xa1),
        _ => Color::Rgb(0x10, 0xac, 0x84),
    }
}

/// Creature sticker per tier; generic fallback above 12.
pub fn level_sticker(level: u32) -> &'static str {
    match level {
        1 => "🐣",
        2 => "🐥",
        3 => "🐤",
        4 => "🐇",
        5 => "🦊",
        6 => "🐱",
        7 => "🐯",
        8 => "🐺",
        9 => "🐲",
        10 => "🐉",
        11 => "🦄",
        12 => "🐘",
        _ => "⭐",
    }
}
