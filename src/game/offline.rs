//! Offline accrual: idle earnings for the time the app was not running.
//!
//! All functions take a caller-supplied `now_ms`; nothing here reads the
//! wall clock.

use super::state::{GameState, OfflinePopup, DOUBLE_THRESHOLD_MS, MAX_OFFLINE_MS};

/// Compute the welcome-back payout for the gap since `last_updated_at`.
///
/// Gaps under one second are treated as noise, not offline time. The payout
/// is capped at 30 minutes of income, but the 6-hour double-eligibility
/// threshold compares the *uncapped* gap, so it reflects true absence.
pub fn compute_offline_earnings(state: &GameState, now_ms: f64) -> Option<OfflinePopup> {
    let diff = now_ms - state.last_updated_at;
    if diff < 1_000.0 {
        return None;
    }
    let effective = diff.min(MAX_OFFLINE_MS);
    Some(OfflinePopup {
        coins: state.income_per_second * (effective / 1_000.0),
        can_double: diff >= DOUBLE_THRESHOLD_MS,
    })
}

/// Collect the popup's coins, close it, and mark the state reconciled.
pub fn apply_offline_earnings(state: &mut GameState, popup: OfflinePopup, now_ms: f64) {
    state.coins += popup.coins;
    state.offline_popup = None;
    state.last_updated_at = now_ms;
}

/// Collect with the ad-doubled payout. Enforced internally: a popup whose
/// gap never reached the double threshold pays single even if the caller
/// asks to double.
pub fn apply_offline_double(state: &mut GameState, popup: OfflinePopup, now_ms: f64) {
    let multiplier = if popup.can_double { 2.0 } else { 1.0 };
    state.coins += popup.coins * multiplier;
    state.offline_popup = None;
    state.last_updated_at = now_ms;
}

/// Startup reconciliation for a restored save. The one-shot last-seen marker
/// is the basis for the gap; without a marker no earnings are offered —
/// the previous session never recorded going away. Either way the state ends
/// reconciled to `now_ms`.
pub fn reconcile_on_startup(state: &mut GameState, last_seen: Option<f64>, now_ms: f64) {
    if let Some(marker) = last_seen {
        state.last_updated_at = marker;
        state.offline_popup = compute_offline_earnings(state, now_ms);
    }
    state.last_updated_at = now_ms;
}
