//! Income computation — pure functions over the grid.

use super::state::GameState;

/// Raw income contribution of a single item tier, before scaling.
pub fn raw_income_for_level(level: u32) -> f64 {
    3.0_f64.powi(level as i32 - 1)
}

/// Total income per second: sum of raw tier incomes, scaled by /1000.
/// The scaling converts power-of-3 growth into a displayed per-second rate
/// and must be applied exactly once.
pub fn calculate_income(state: &GameState) -> f64 {
    let raw: f64 = state
        .grid
        .iter()
        .filter_map(|c| c.level())
        .map(raw_income_for_level)
        .sum();
    raw / 1000.0
}

/// Refresh the derived `income_per_second` cache. Called after every grid
/// mutation so no state escapes with a stale value.
pub fn recompute_income(state: &mut GameState) {
    state.income_per_second = calculate_income(state);
}

/// Coin display format: two decimals, thousands separators on the integer
/// part (e.g. `12,345.67`).
pub fn format_coins(n: f64) -> String {
    let negative = n < 0.0;
    let n = n.abs();
    let int_part = n.trunc() as u64;
    let frac = ((n - n.trunc()) * 100.0).round() as u64;
    // Rounding the fraction can carry into the integer part.
    let (int_part, frac) = if frac >= 100 { (int_part + 1, 0) } else { (int_part, frac) };

    let digits = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Cell;

    #[test]
    fn raw_income_powers_of_three() {
        assert!((raw_income_for_level(1) - 1.0).abs() < f64::EPSILON);
        assert!((raw_income_for_level(2) - 3.0).abs() < f64::EPSILON);
        assert!((raw_income_for_level(5) - 81.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_grid_has_zero_income() {
        let s = GameState::new(0.0);
        assert!((calculate_income(&s) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn income_sums_items_and_scales_once() {
        let mut s = GameState::new(0.0);
        s.grid[0] = Cell::Item { level: 1 }; // 1
        s.grid[4] = Cell::Item { level: 3 }; // 9
        s.grid[8] = Cell::Item { level: 4 }; // 27
        // Locked cells contribute nothing.
        assert!((calculate_income(&s) - 37.0 / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn recompute_refreshes_cache() {
        let mut s = GameState::new(0.0);
        s.grid[0] = Cell::Item { level: 2 };
        recompute_income(&mut s);
        assert!((s.income_per_second - 0.003).abs() < 1e-12);

        s.grid[0] = Cell::Empty;
        recompute_income(&mut s);
        assert!((s.income_per_second - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn format_coins_basic() {
        assert_eq!(format_coins(0.0), "0.00");
        assert_eq!(format_coins(18.0), "18.00");
        assert_eq!(format_coins(0.01), "0.01");
        assert_eq!(format_coins(1234.5), "1,234.50");
        assert_eq!(format_coins(1_000_000.0), "1,000,000.00");
    }

    #[test]
    fn format_coins_fraction_carry() {
        // 999.999 rounds the cents up into the integer part.
        assert_eq!(format_coins(999.999), "1,000.00");
    }
}
