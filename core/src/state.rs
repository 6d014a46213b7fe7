//! The game state aggregate.
//!
//! RULE: Only engine::transition produces new GameState values.
//! Everyone else reads an `Arc<GameState>` snapshot.

use crate::{
    config::EconomyConfig,
    ledger::{Subscription, Transaction},
    types::{Money, Month},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Spend,
    #[default]
    Home,
    Invest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub player_name:    String,
    pub current_month:  Month,
    pub current_tab:    Tab,
    pub wallet:         Money,
    pub savings:        Money,
    pub investments:    Money,
    /// Display order = subscription order.
    pub subscriptions:  Vec<Subscription>,
    /// Newest first.
    pub transactions:   Vec<Transaction>,
    pub scams_avoided:  u32,
    pub scams_fell_for: u32,
    pub total_earned:   Money,
    pub total_spent:    Money,
    pub game_started:   bool,
    pub game_ended:     bool,
    /// One point per month reached; `len() == current_month`.
    pub wealth_history: Vec<Money>,
}

impl GameState {
    /// The canonical state every session starts from and every reset returns to.
    pub fn initial(config: &EconomyConfig) -> Self {
        Self {
            player_name:    String::new(),
            current_month:  1,
            current_tab:    Tab::Home,
            wallet:         config.starting_wallet,
            savings:        0,
            investments:    0,
            subscriptions:  Vec::new(),
            transactions:   Vec::new(),
            scams_avoided:  0,
            scams_fell_for: 0,
            total_earned:   config.starting_wallet,
            total_spent:    0,
            game_started:   false,
            game_ended:     false,
            wealth_history: vec![config.starting_wallet],
        }
    }

    pub fn total_wealth(&self) -> Money {
        self.wallet + self.savings + self.investments
    }

    pub fn has_subscription(&self, id: &str) -> bool {
        self.subscriptions.iter().any(|s| s.id == id)
    }

    pub fn monthly_subscription_cost(&self) -> Money {
        self.subscriptions.iter().map(|s| s.monthly_cost).sum()
    }

    pub fn latest_transaction(&self) -> Option<&Transaction> {
        self.transactions.first()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial(&EconomyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_matches_canonical_defaults() {
        let state = GameState::default();
        assert_eq!(state.current_month, 1);
        assert_eq!(state.current_tab, Tab::Home);
        assert_eq!(state.wallet, 100);
        assert_eq!(state.total_earned, 100);
        assert_eq!(state.wealth_history, vec![100]);
        assert!(!state.game_started && !state.game_ended);
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn subscription_helpers() {
        let mut state = GameState::default();
        state.subscriptions.push(Subscription::new("disney", "Disney+", 12, "🏰"));
        state.subscriptions.push(Subscription::new("books", "Epic! Books", 10, "📚"));

        assert!(state.has_subscription("books"));
        assert!(!state.has_subscription("roblox"));
        assert_eq!(state.monthly_subscription_cost(), 22);
    }
}
