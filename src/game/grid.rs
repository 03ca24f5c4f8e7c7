//! Grid mutation primitives — spawn, unlock, queue, delete.
//!
//! Every function is total: disallowed inputs leave the state unchanged and
//! return `false`. Each successful grid mutation recomputes the income cache.

use super::economy::recompute_income;
use super::state::{Cell, GameState, QueuedItem};

/// Highest tier on the board when spawn levels step up.
const SPAWN_STEP_THRESHOLD: u32 = 12;

/// First empty cell in index order.
fn first_empty(state: &GameState) -> Option<usize> {
    state.grid.iter().position(Cell::is_empty)
}

/// Place an item of `level` in the first empty cell. With a full grid the
/// spawn is queued (one slot); with a full grid and an occupied queue it is
/// silently dropped — backpressure, not an error.
pub fn spawn_item_of_level(state: &mut GameState, level: u32) -> bool {
    if let Some(idx) = first_empty(state) {
        state.grid[idx] = Cell::Item { level };
        recompute_income(state);
        return true;
    }
    if state.queue.is_none() {
        state.queue = Some(QueuedItem { level });
        return true;
    }
    false
}

/// Level of the free periodic spawn: 1, or 2 once the board has reached
/// tier 12.
pub fn spawn_free_level(state: &GameState) -> u32 {
    if highest_level(state) >= SPAWN_STEP_THRESHOLD { 2 } else { 1 }
}

/// Level of the ad-reward spawn: 3, or 4 past the same threshold.
pub fn spawn_ad_level(state: &GameState) -> u32 {
    if highest_level(state) >= SPAWN_STEP_THRESHOLD { 4 } else { 3 }
}

pub fn spawn_free_item(state: &mut GameState) -> bool {
    let level = spawn_free_level(state);
    spawn_item_of_level(state, level)
}

pub fn spawn_ad_item(state: &mut GameState) -> bool {
    let level = spawn_ad_level(state);
    spawn_item_of_level(state, level)
}

/// Maximum item tier on the board; 1 when the board has no items (the
/// default that spawn-level selection relies on).
pub fn highest_level(state: &GameState) -> u32 {
    state
        .grid
        .iter()
        .filter_map(Cell::level)
        .max()
        .unwrap_or(1)
}

/// Buy a locked cell. Requires: the cell is locked, coins cover the price,
/// and the previous locked cell is already open (unlocks go 9 → 10 → 11).
pub fn unlock_cell(state: &mut GameState, index: usize) -> bool {
    let price = match state.grid.get(index) {
        Some(Cell::Locked { price }) => *price,
        _ => return false,
    };
    if state.coins < price {
        return false;
    }
    // Sequential precondition: 10 needs 9 open, 11 needs 10 open.
    if index == 10 && matches!(state.grid[9], Cell::Locked { .. }) {
        return false;
    }
    if index == 11 && matches!(state.grid[10], Cell::Locked { .. }) {
        return false;
    }

    state.grid[index] = Cell::Empty;
    state.coins -= price;
    recompute_income(state);
    true
}

/// Drain the queued spawn into the first empty cell, if both exist.
/// Idempotent: calling with no queue entry (or no empty cell) is a no-op.
pub fn consume_queue(state: &mut GameState) -> bool {
    let queued = match state.queue {
        Some(q) => q,
        None => return false,
    };
    let idx = match first_empty(state) {
        Some(i) => i,
        None => return false,
    };
    state.grid[idx] = Cell::Item { level: queued.level };
    state.queue = None;
    recompute_income(state);
    true
}

/// Clear an item cell (trash). Locked and empty cells cannot be deleted.
pub fn delete_item(state: &mut GameState, index: usize) -> bool {
    match state.grid.get(index) {
        Some(Cell::Item { .. }) => {}
        _ => return false,
    }
    state.grid[index] = Cell::Empty;
    recompute_income(state);
    true
}
