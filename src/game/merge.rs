//! Merge engine: manual drops (drag gesture) and the automatic merge tick.

use super::economy::recompute_income;
use super::grid::{consume_queue, delete_item};
use super::state::{Cell, GameState, AUTO_MERGE_DURATION_MS, AUTO_MERGE_PRICE, GRID_SIZE};

/// Drop target meaning "the trash bin" (the original UI passed -1).
pub const TRASH_INDEX: usize = usize::MAX;

/// What a manual drop did. `Rejected` means the state is unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropOutcome {
    Rejected,
    Moved,
    Swapped,
    /// Two same-level items combined; `to` holds the upgraded item.
    /// The only outcome that raises a level.
    Merged { to: usize },
    Deleted,
}

/// Resolve a drag gesture `from → to`.
///
/// - `from == to`: no-op.
/// - `to == TRASH_INDEX`: delete the dragged item.
/// - Empty destination: move. Same level: merge. Different level: swap.
/// - Non-item source or locked destination: rejected.
///
/// Any successful mutation recomputes income and drains the spawn queue
/// (a move or merge may have freed a slot for the queued item).
pub fn handle_drop(state: &mut GameState, from: usize, to: usize) -> DropOutcome {
    if from == to {
        return DropOutcome::Rejected;
    }
    if to == TRASH_INDEX {
        return if delete_item(state, from) {
            consume_queue(state);
            DropOutcome::Deleted
        } else {
            DropOutcome::Rejected
        };
    }
    if from >= GRID_SIZE || to >= GRID_SIZE {
        return DropOutcome::Rejected;
    }

    let from_level = match state.grid[from] {
        Cell::Item { level } => level,
        _ => return DropOutcome::Rejected,
    };

    let outcome = match state.grid[to] {
        Cell::Locked { .. } => return DropOutcome::Rejected,
        Cell::Empty => {
            state.grid[to] = Cell::Item { level: from_level };
            state.grid[from] = Cell::Empty;
            DropOutcome::Moved
        }
        Cell::Item { level } if level == from_level => {
            state.grid[to] = Cell::Item { level: level + 1 };
            state.grid[from] = Cell::Empty;
            DropOutcome::Merged { to }
        }
        Cell::Item { level } => {
            state.grid[to] = Cell::Item { level: from_level };
            state.grid[from] = Cell::Item { level };
            DropOutcome::Swapped
        }
    };

    recompute_income(state);
    consume_queue(state);
    outcome
}

/// Buy the auto-merge power-up: 24 hours of one automatic merge per second.
/// No-op when already running or unaffordable.
pub fn enable_auto_merge(state: &mut GameState, now_ms: f64) -> bool {
    if state.auto_merge_enabled || state.coins < AUTO_MERGE_PRICE {
        return false;
    }
    state.coins -= AUTO_MERGE_PRICE;
    state.auto_merge_enabled = true;
    state.auto_merge_expires_at = Some(now_ms + AUTO_MERGE_DURATION_MS);
    true
}

/// One automatic merge step, invoked once per second while enabled.
///
/// Expiry is checked first: a lapsed subscription clears both flags and
/// performs no merge that tick. Otherwise the lowest tier with a duplicate
/// is merged — exactly one pair, in grid scan order — so low tiers are
/// cleared before high ones. Returns whether the state changed.
pub fn auto_merge_tick(state: &mut GameState, now_ms: f64) -> bool {
    if !state.auto_merge_enabled {
        return false;
    }
    if let Some(expires_at) = state.auto_merge_expires_at {
        if now_ms > expires_at {
            state.auto_merge_enabled = false;
            state.auto_merge_expires_at = None;
            return true;
        }
    }

    let pair = find_lowest_duplicate_pair(state);
    let (a, b, level) = match pair {
        Some(p) => p,
        None => return false,
    };

    state.grid[a] = Cell::Item { level: level + 1 };
    state.grid[b] = Cell::Empty;
    recompute_income(state);
    true
}

/// First two indices (scan order) of the lowest tier that appears at least
/// twice on the board.
fn find_lowest_duplicate_pair(state: &GameState) -> Option<(usize, usize, u32)> {
    let mut best: Option<(usize, usize, u32)> = None;
    for level in state.grid.iter().filter_map(Cell::level) {
        if best.is_some_and(|(_, _, l)| l <= level) {
            continue;
        }
        let mut indices = state
            .grid
            .iter()
            .enumerate()
            .filter(|(_, c)| c.level() == Some(level))
            .map(|(i, _)| i);
        if let (Some(a), Some(b)) = (indices.next(), indices.next()) {
            best = Some((a, b, level));
        }
    }
    best
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::game::economy::{calculate_income, recompute_income};
    use crate::game::grid::{consume_queue, delete_item, spawn_item_of_level, unlock_cell};
    use proptest::prelude::*;

    fn arb_cell() -> impl Strategy<Value = Cell> {
        prop_oneof![
            3 => Just(Cell::Empty),
            4 => (1u32..15).prop_map(|level| Cell::Item { level }),
        ]
    }

    fn arb_state() -> impl Strategy<Value = GameState> {
        (
            proptest::collection::vec(arb_cell(), 9),
            0.0f64..200_000.0,
        )
            .prop_map(|(cells, coins)| {
                let mut s = GameState::new(0.0);
                for (i, c) in cells.into_iter().enumerate() {
                    s.grid[i] = c;
                }
                s.coins = coins;
                recompute_income(&mut s);
                s
            })
    }

    /// Apply one arbitrary public transition.
    fn apply_op(s: &mut GameState, op: u8, a: usize, b: usize) {
        match op % 6 {
            0 => {
                handle_drop(s, a % GRID_SIZE, b % GRID_SIZE);
            }
            1 => {
                handle_drop(s, a % GRID_SIZE, TRASH_INDEX);
            }
            2 => {
                spawn_item_of_level(s, (b % 9 + 1) as u32);
            }
            3 => {
                unlock_cell(s, 9 + a % 3);
            }
            4 => {
                delete_item(s, a % GRID_SIZE);
            }
            _ => {
                s.auto_merge_enabled = true;
                s.auto_merge_expires_at = Some(1e15);
                auto_merge_tick(s, 0.0);
            }
        }
        consume_queue(s);
    }

    proptest! {
        /// The income cache never goes stale, whatever sequence of public
        /// transitions runs.
        #[test]
        fn prop_income_cache_consistent(
            mut s in arb_state(),
            ops in proptest::collection::vec((any::<u8>(), 0usize..12, 0usize..12), 1..40),
        ) {
            for (op, a, b) in ops {
                apply_op(&mut s, op, a, b);
                prop_assert!(
                    (s.income_per_second - calculate_income(&s)).abs() < 1e-12,
                    "stale income cache: {} vs {}",
                    s.income_per_second,
                    calculate_income(&s)
                );
            }
        }

        /// Grid length is fixed and coins never go negative.
        #[test]
        fn prop_structural_invariants(
            mut s in arb_state(),
            ops in proptest::collection::vec((any::<u8>(), 0usize..12, 0usize..12), 1..40),
        ) {
            for (op, a, b) in ops {
                apply_op(&mut s, op, a, b);
                prop_assert_eq!(s.grid.len(), GRID_SIZE);
                prop_assert!(s.coins >= 0.0, "coins went negative: {}", s.coins);
            }
        }

        /// A merge raises the total raw power or is a no-op; drops never
        /// invent items.
        #[test]
        fn prop_drop_preserves_or_merges_items(mut s in arb_state(), from in 0usize..12, to in 0usize..12) {
            s.queue = None;
            let count_before = s.grid.iter().filter(|c| c.is_item()).count();
            let outcome = handle_drop(&mut s, from, to);
            let count_after = s.grid.iter().filter(|c| c.is_item()).count();
            match outcome {
                DropOutcome::Merged { .. } | DropOutcome::Deleted => {
                    prop_assert_eq!(count_after, count_before - 1)
                }
                _ => prop_assert_eq!(count_after, count_before),
            }
        }
    }
}
