//! Semantic action IDs for Merge Creatures click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Control buttons ─────────────────────────────────────────────
pub const SPAWN_FREE: u16 = 1;
pub const SPAWN_AD: u16 = 2;
pub const BUY_AUTO_MERGE: u16 = 3;

// ── Trash bin (drop target for the selected item) ───────────────
pub const TRASH: u16 = 10;

// ── Offline popup buttons ───────────────────────────────────────
pub const COLLECT_OFFLINE: u16 = 20;
pub const DOUBLE_OFFLINE: u16 = 21;

// ── Grid cells (base + cell index 0..11) ────────────────────────
pub const CELL_BASE: u16 = 100;
