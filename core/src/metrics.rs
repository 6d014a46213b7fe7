//! Derived metrics: aggregate views computed from a snapshot on every read.
//! Nothing here is cached or written back into GameState.

use crate::{
    config::EconomyConfig,
    state::GameState,
    types::{Money, Month},
};
use serde::{Deserialize, Serialize};

/// Used when the wealth history holds no usable reference point.
pub const FALLBACK_PREVIOUS_WEALTH: Money = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DerivedMetrics {
    pub total_wealth:              Money,
    pub previous_wealth:           Money,
    pub monthly_change:            Money,
    pub monthly_change_percent:    f64,
    pub monthly_subscription_cost: Money,
    pub months_remaining:          Month,
}

impl DerivedMetrics {
    pub fn from_state(state: &GameState, config: &EconomyConfig) -> Self {
        Self::with_final_month(state, config.final_month)
    }

    pub fn with_final_month(state: &GameState, final_month: Month) -> Self {
        let total_wealth = state.total_wealth();
        let previous_wealth = previous_wealth(&state.wealth_history);
        let monthly_change = total_wealth - previous_wealth;
        let monthly_change_percent = if previous_wealth > 0 {
            monthly_change as f64 / previous_wealth as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_wealth,
            previous_wealth,
            monthly_change,
            monthly_change_percent,
            monthly_subscription_cost: state.monthly_subscription_cost(),
            months_remaining: final_month.saturating_sub(state.current_month),
        }
    }
}

/// Second-to-last point, else the first, else the fallback.
/// A zero point counts as missing.
fn previous_wealth(history: &[Money]) -> Money {
    let second_last = history.len().checked_sub(2).and_then(|i| history.get(i));
    [second_last, history.first()]
        .into_iter()
        .flatten()
        .copied()
        .find(|w| *w != 0)
        .unwrap_or(FALLBACK_PREVIOUS_WEALTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_compares_against_seed_point() {
        let mut state = GameState::default();
        state.wallet = 95;

        let m = DerivedMetrics::from_state(&state, &EconomyConfig::default());
        assert_eq!(m.total_wealth, 95);
        assert_eq!(m.previous_wealth, 100);
        assert_eq!(m.monthly_change, -5);
        assert!((m.monthly_change_percent - (-5.0)).abs() < 1e-9);
        assert_eq!(m.months_remaining, 11);
    }

    #[test]
    fn uses_second_to_last_history_point() {
        let mut state = GameState::default();
        state.wealth_history = vec![100, 180, 250];
        state.current_month = 3;
        state.wallet = 250;

        let m = DerivedMetrics::from_state(&state, &EconomyConfig::default());
        assert_eq!(m.previous_wealth, 180);
        assert_eq!(m.monthly_change, 70);
    }

    #[test]
    fn zero_points_fall_through_to_fallback() {
        assert_eq!(previous_wealth(&[]), 100);
        assert_eq!(previous_wealth(&[0]), 100);
        assert_eq!(previous_wealth(&[40, 0, 10]), 40);
    }

    #[test]
    fn negative_previous_wealth_reports_zero_percent() {
        let mut state = GameState::default();
        state.wealth_history = vec![100, -20, 30];
        state.wallet = 30;

        let m = DerivedMetrics::from_state(&state, &EconomyConfig::default());
        assert_eq!(m.previous_wealth, -20);
        assert_eq!(m.monthly_change, 50);
        assert_eq!(m.monthly_change_percent, 0.0);
    }
}
