//! The economy engine.
//!
//! `transition` is the only function that produces a new GameState.
//!
//! RULES:
//!   - Pure: no I/O, no clock, no ambient randomness.
//!   - Total: every action yields a state; nothing panics or errors.
//!   - Rejected and ignored actions return the input state untouched
//!     and record no transaction.
//!   - The investment return comes from the injected MarketModel,
//!     ledger ids from the injected IdSource.

use crate::{
    action::GameAction,
    config::EconomyConfig,
    ledger::{IdSource, SequentialIds, Subscription, Transaction, TransactionKind},
    market::{MarketModel, RandomMarket},
    rng::{RngBank, RngSlot},
    state::GameState,
    types::Money,
};
use serde::{Deserialize, Serialize};

/// The injected collaborators the engine needs to stay pure.
pub struct EngineEnv {
    pub config: EconomyConfig,
    market:     Box<dyn MarketModel>,
    ids:        Box<dyn IdSource>,
}

impl EngineEnv {
    pub fn new(
        config: EconomyConfig,
        market: Box<dyn MarketModel>,
        ids: Box<dyn IdSource>,
    ) -> Self {
        Self { config, market, ids }
    }

    /// Seeded market stream plus sequential ids.
    pub fn seeded(config: EconomyConfig, bank: &RngBank) -> Self {
        let market = RandomMarket::new(bank.for_slot(RngSlot::Market), &config);
        Self::new(config, Box::new(market), Box::new(SequentialIds::new()))
    }

    fn next_id(&mut self) -> String {
        self.ids.next_id()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientFunds,
    NonPositiveAmount,
    AlreadySubscribed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// The action was understood but the rules refused it.
    Rejected(RejectReason),
    /// Nothing to do: unknown action, absent subscription, game already over.
    Ignored,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state:   GameState,
    pub outcome: Outcome,
}

impl Transition {
    fn applied(state: GameState) -> Self {
        Self { state, outcome: Outcome::Applied }
    }

    fn rejected(state: &GameState, reason: RejectReason) -> Self {
        Self { state: state.clone(), outcome: Outcome::Rejected(reason) }
    }

    fn ignored(state: &GameState) -> Self {
        Self { state: state.clone(), outcome: Outcome::Ignored }
    }
}

/// Compute the next state for `action`.
pub fn transition(state: &GameState, action: &GameAction, env: &mut EngineEnv) -> Transition {
    match action {
        GameAction::SetPlayerName { name } => {
            let mut next = state.clone();
            next.player_name = name.clone();
            Transition::applied(next)
        }

        GameAction::StartGame => {
            let mut next = state.clone();
            next.game_started = true;
            Transition::applied(next)
        }

        GameAction::SetTab { tab } => {
            let mut next = state.clone();
            next.current_tab = *tab;
            Transition::applied(next)
        }

        GameAction::BuyItem { name, cost, icon } => buy_item(state, name, *cost, icon, env),

        GameAction::AddSubscription { subscription } => {
            add_subscription(state, subscription, env)
        }

        GameAction::RemoveSubscription { id } => {
            if !state.has_subscription(id) {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.subscriptions.retain(|s| &s.id != id);
            Transition::applied(next)
        }

        GameAction::TransferToSavings { amount } => {
            let moved = (*amount).min(state.wallet);
            if moved <= 0 {
                return Transition::rejected(state, RejectReason::NonPositiveAmount);
            }
            let mut next = state.clone();
            next.wallet -= moved;
            next.savings += moved;
            record(&mut next, env, TransactionKind::Transfer, "Transfer to Savings", moved, "🏦");
            Transition::applied(next)
        }

        GameAction::TransferToWallet { amount } => {
            let moved = (*amount).min(state.savings);
            if moved <= 0 {
                return Transition::rejected(state, RejectReason::NonPositiveAmount);
            }
            let mut next = state.clone();
            next.savings -= moved;
            next.wallet += moved;
            record(&mut next, env, TransactionKind::Transfer, "Transfer to Wallet", moved, "💰");
            Transition::applied(next)
        }

        GameAction::TransferToInvestments { amount } => {
            let moved = (*amount).min(state.wallet);
            if moved <= 0 {
                return Transition::rejected(state, RejectReason::NonPositiveAmount);
            }
            let mut next = state.clone();
            next.wallet -= moved;
            next.investments += moved;
            record(&mut next, env, TransactionKind::Investment, "Invested", moved, "📈");
            Transition::applied(next)
        }

        GameAction::AdvanceMonth => advance_month(state, env),

        GameAction::ScamAvoided => {
            let mut next = state.clone();
            next.scams_avoided += 1;
            Transition::applied(next)
        }

        GameAction::ScamFellFor { penalty } => {
            // A wallet already overdrawn by subscriptions has nothing to lose.
            let loss = (*penalty).min(state.wallet).max(0);
            let mut next = state.clone();
            next.wallet -= loss;
            next.total_spent += loss;
            next.scams_fell_for += 1;
            record(&mut next, env, TransactionKind::Purchase, "Scam Loss", -loss, "🚨");
            Transition::applied(next)
        }

        GameAction::ResetGame => {
            env.ids.reset();
            Transition::applied(GameState::initial(&env.config))
        }

        GameAction::Unknown => Transition::ignored(state),
    }
}

fn buy_item(
    state: &GameState,
    name: &str,
    cost: Money,
    icon: &str,
    env: &mut EngineEnv,
) -> Transition {
    if cost <= 0 {
        return Transition::rejected(state, RejectReason::NonPositiveAmount);
    }
    if state.wallet < cost {
        return Transition::rejected(state, RejectReason::InsufficientFunds);
    }
    let mut next = state.clone();
    next.wallet -= cost;
    next.total_spent += cost;
    record(&mut next, env, TransactionKind::Purchase, name, -cost, icon);
    Transition::applied(next)
}

fn add_subscription(state: &GameState, sub: &Subscription, env: &mut EngineEnv) -> Transition {
    if state.has_subscription(&sub.id) {
        return Transition::rejected(state, RejectReason::AlreadySubscribed);
    }
    if sub.monthly_cost <= 0 {
        return Transition::rejected(state, RejectReason::NonPositiveAmount);
    }
    if state.wallet < sub.monthly_cost {
        return Transition::rejected(state, RejectReason::InsufficientFunds);
    }
    let mut next = state.clone();
    // First month is billed up front.
    next.wallet -= sub.monthly_cost;
    next.total_spent += sub.monthly_cost;
    next.subscriptions.push(sub.clone());
    record(
        &mut next,
        env,
        TransactionKind::Subscription,
        &sub.name,
        -sub.monthly_cost,
        &sub.icon,
    );
    Transition::applied(next)
}

/// The month-end step: allowance, interest, market return, billing.
fn advance_month(state: &GameState, env: &mut EngineEnv) -> Transition {
    if state.current_month >= env.config.final_month {
        if state.game_ended {
            return Transition::ignored(state);
        }
        let mut next = state.clone();
        next.game_ended = true;
        return Transition::applied(next);
    }

    let allowance = env.config.monthly_allowance;
    let interest = (state.savings as f64 * env.config.savings_interest_rate).round() as Money;
    let rate = env.market.monthly_return();
    let investment_return = (state.investments as f64 * rate).round() as Money;
    let subscription_total = state.monthly_subscription_cost();
    let month = state.current_month + 1;

    let mut entries = vec![Transaction::new(
        env.next_id(),
        TransactionKind::Allowance,
        "Monthly Allowance",
        allowance,
        month,
        "💵",
    )];

    if interest > 0 {
        entries.push(Transaction::new(
            env.next_id(),
            TransactionKind::Interest,
            "Savings Interest",
            interest,
            month,
            "✨",
        ));
    }

    if state.investments > 0 {
        let (description, icon) = if investment_return >= 0 {
            ("Investment Gains", "📈")
        } else {
            ("Investment Loss", "📉")
        };
        entries.push(Transaction::new(
            env.next_id(),
            TransactionKind::Investment,
            description,
            investment_return,
            month,
            icon,
        ));
    }

    for sub in &state.subscriptions {
        entries.push(Transaction::new(
            env.next_id(),
            TransactionKind::Subscription,
            sub.name.clone(),
            -sub.monthly_cost,
            month,
            sub.icon.clone(),
        ));
    }

    let mut next = state.clone();
    // No floor on the wallet: overspending on subscriptions is the lesson.
    next.wallet = state.wallet + allowance - subscription_total;
    next.savings = state.savings + interest;
    next.investments = (state.investments + investment_return).max(0);
    next.total_earned += allowance + interest + investment_return.max(0);
    next.total_spent += subscription_total;
    next.current_month = month;

    entries.append(&mut next.transactions);
    next.transactions = entries;

    let wealth = next.total_wealth();
    next.wealth_history.push(wealth);

    Transition::applied(next)
}

/// Prepend a ledger entry stamped with the state's current month.
fn record(
    state: &mut GameState,
    env: &mut EngineEnv,
    kind: TransactionKind,
    description: &str,
    amount: Money,
    icon: &str,
) {
    let txn = Transaction::new(
        env.next_id(),
        kind,
        description,
        amount,
        state.current_month,
        icon,
    );
    state.transactions.insert(0, txn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::FixedMarket;

    fn env_with(rate: f64) -> EngineEnv {
        EngineEnv::new(
            EconomyConfig::default(),
            Box::new(FixedMarket(rate)),
            Box::new(SequentialIds::new()),
        )
    }

    #[test]
    fn ids_come_from_injected_source() {
        let mut env = env_with(0.0);
        let state = GameState::default();

        let t1 = transition(&state, &GameAction::buy("Candy", 5, "🍬"), &mut env);
        let t2 = transition(&t1.state, &GameAction::buy("Popcorn", 6, "🍿"), &mut env);

        let ids: Vec<&str> = t2.state.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["txn-2", "txn-1"]);
    }

    #[test]
    fn month_block_keeps_allowance_first() {
        let mut env = env_with(0.1);
        let mut state = GameState::default();
        state.savings = 100;
        state.investments = 50;
        state.subscriptions.push(Subscription::new("spotify", "Spotify Kids", 8, "🎵"));

        let next = transition(&state, &GameAction::AdvanceMonth, &mut env).state;

        let kinds: Vec<TransactionKind> = next.transactions.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::Allowance,
                TransactionKind::Interest,
                TransactionKind::Investment,
                TransactionKind::Subscription,
            ]
        );
        assert!(next.transactions.iter().all(|t| t.month == 2));
    }

    #[test]
    fn halves_round_away_from_zero() {
        // 25 * 0.02 = 0.5 -> 1
        let mut env = env_with(0.0);
        let mut state = GameState::default();
        state.savings = 25;

        let next = transition(&state, &GameAction::AdvanceMonth, &mut env).state;
        assert_eq!(next.savings, 26);
    }
}
