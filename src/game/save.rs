//! Save/load for Merge Creatures.
//!
//! ## Versioning policy
//!
//! - `SAVE_VERSION`: current save format version. Increment when adding
//!   fields.
//! - `MIN_COMPATIBLE_VERSION`: oldest version that can still be loaded.
//!   Only increment on breaking changes (field meaning changes, removals);
//!   additive changes keep it as-is and missing fields fill with defaults.
//!
//! Two separate localStorage keys: the state snapshot (written after every
//! mutation) and the last-seen timestamp (written when the tab hides or
//! unloads, consumed exactly once at the next startup for offline earnings).
//! `income_per_second` and the offline popup are transient and never stored.

#[cfg(any(target_arch = "wasm32", test))]
use serde::{Deserialize, Serialize};

#[cfg(any(target_arch = "wasm32", test))]
use super::economy::recompute_income;
#[cfg(any(target_arch = "wasm32", test))]
use super::state::{Cell, GameState, QueuedItem, GRID_SIZE};

#[cfg(any(target_arch = "wasm32", test))]
const SAVE_VERSION: u32 = 1;

#[cfg(any(target_arch = "wasm32", test))]
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage keys.
#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "merge_creatures_save";
#[cfg(target_arch = "wasm32")]
const LAST_SEEN_KEY: &str = "merge_creatures_last_seen";

/// Cell tags for the compact `(tag, value)` grid encoding.
#[cfg(any(target_arch = "wasm32", test))]
const TAG_EMPTY: u8 = 0;
#[cfg(any(target_arch = "wasm32", test))]
const TAG_ITEM: u8 = 1;
#[cfg(any(target_arch = "wasm32", test))]
const TAG_LOCKED: u8 = 2;

#[cfg(any(target_arch = "wasm32", test))]
#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    game: GameSave,
}

#[cfg(any(target_arch = "wasm32", test))]
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct GameSave {
    /// Cells as (tag, value): (0,_)=empty, (1,level)=item, (2,price)=locked.
    grid: Vec<(u8, f64)>,
    coins: f64,
    last_updated_at: f64,
    /// Pending spawn level, if the queue holds one.
    queue_level: Option<u32>,
    auto_merge_enabled: bool,
    auto_merge_expires_at: Option<f64>,
}

#[cfg(any(target_arch = "wasm32", test))]
fn extract_save(state: &GameState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: GameSave {
            grid: state
                .grid
                .iter()
                .map(|c| match c {
                    Cell::Empty => (TAG_EMPTY, 0.0),
                    Cell::Item { level } => (TAG_ITEM, f64::from(*level)),
                    Cell::Locked { price } => (TAG_LOCKED, *price),
                })
                .collect(),
            coins: state.coins,
            last_updated_at: state.last_updated_at,
            queue_level: state.queue.map(|q| q.level),
            auto_merge_enabled: state.auto_merge_enabled,
            auto_merge_expires_at: state.auto_merge_expires_at,
        },
    }
}

/// Restore saved fields onto a fresh state. A grid of the wrong length is
/// ignored (the default layout stays); the income cache is always recomputed
/// from the restored grid, never read from storage. The offline popup stays
/// cleared and `last_updated_at` is the caller's concern.
#[cfg(any(target_arch = "wasm32", test))]
fn apply_save(state: &mut GameState, save: &GameSave) {
    if save.grid.len() == GRID_SIZE {
        for (cell, &(tag, value)) in state.grid.iter_mut().zip(&save.grid) {
            *cell = match tag {
                TAG_ITEM => Cell::Item { level: (value as u32).max(1) },
                TAG_LOCKED => Cell::Locked { price: value.max(0.0) },
                _ => Cell::Empty,
            };
        }
    }

    state.coins = save.coins.max(0.0);
    state.last_updated_at = save.last_updated_at;
    state.queue = save.queue_level.map(|level| QueuedItem { level });
    state.auto_merge_enabled = save.auto_merge_enabled;
    state.auto_merge_expires_at = save.auto_merge_expires_at;
    // Enabled without a deadline would never expire; drop the flag instead.
    if state.auto_merge_expires_at.is_none() {
        state.auto_merge_enabled = false;
    }

    recompute_income(state);
}

#[cfg(target_arch = "wasm32")]
fn get_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Persist the snapshot. Failures are logged and ignored; a write failure
/// must never break the transition pipeline.
#[cfg(target_arch = "wasm32")]
pub fn save_game(state: &GameState) {
    let save_data = extract_save(state);
    let json = match serde_json::to_string(&save_data) {
        Ok(j) => j,
        Err(e) => {
            web_sys::console::warn_1(&format!("merge-creatures: save serialize failed: {e}").into());
            return;
        }
    };

    if let Some(storage) = get_storage() {
        if let Err(e) = storage.set_item(STORAGE_KEY, &json) {
            web_sys::console::warn_1(
                &format!("merge-creatures: localStorage write failed: {e:?}").into(),
            );
        }
    }
}

/// Restore the snapshot into `state`. Returns false (leaving the fresh
/// default) when there is no save, the JSON is corrupt, or the version is
/// older than `MIN_COMPATIBLE_VERSION`; corrupt data is removed.
#[cfg(target_arch = "wasm32")]
pub fn load_game(state: &mut GameState) -> bool {
    let storage = match get_storage() {
        Some(s) => s,
        None => return false,
    };

    let json = match storage.get_item(STORAGE_KEY) {
        Ok(Some(j)) => j,
        _ => return false,
    };

    let save_data: SaveData = match serde_json::from_str(&json) {
        Ok(d) => d,
        Err(e) => {
            web_sys::console::warn_1(
                &format!("merge-creatures: save parse failed (discarding): {e}").into(),
            );
            let _ = storage.remove_item(STORAGE_KEY);
            return false;
        }
    };

    if save_data.version < MIN_COMPATIBLE_VERSION {
        web_sys::console::log_1(
            &format!(
                "merge-creatures: save too old (saved={}, min_compatible={}), starting fresh",
                save_data.version, MIN_COMPATIBLE_VERSION
            )
            .into(),
        );
        let _ = storage.remove_item(STORAGE_KEY);
        return false;
    }

    apply_save(state, &save_data.game);
    true
}

/// Record the moment the app went hidden / is about to close.
#[cfg(target_arch = "wasm32")]
pub fn save_last_seen(now_ms: f64) {
    if let Some(storage) = get_storage() {
        if let Err(e) = storage.set_item(LAST_SEEN_KEY, &now_ms.to_string()) {
            web_sys::console::warn_1(
                &format!("merge-creatures: last-seen write failed: {e:?}").into(),
            );
        }
    }
}

/// Read and delete the last-seen marker (one-shot). `None` means no offline
/// reconciliation is needed.
#[cfg(target_arch = "wasm32")]
pub fn take_last_seen() -> Option<f64> {
    let storage = get_storage()?;
    let raw = storage.get_item(LAST_SEEN_KEY).ok()??;
    let _ = storage.remove_item(LAST_SEEN_KEY);
    let ts: f64 = raw.parse().ok()?;
    if ts.is_finite() && ts > 0.0 {
        Some(ts)
    } else {
        None
    }
}
