//! Derived metrics read from states produced by the engine.

use piggy_core::{
    action::GameAction,
    catalog::subscription_item,
    config::EconomyConfig,
    engine::{transition, EngineEnv},
    ledger::SequentialIds,
    market::FixedMarket,
    metrics::DerivedMetrics,
    state::GameState,
};

fn env() -> EngineEnv {
    EngineEnv::new(
        EconomyConfig::default(),
        Box::new(FixedMarket(0.0)),
        Box::new(SequentialIds::new()),
    )
}

#[test]
fn month_over_month_change_tracks_history() {
    let mut env = env();
    let mut state = GameState::default();
    state = transition(&state, &GameAction::TransferToSavings { amount: 50 }, &mut env).state;
    state = transition(&state, &GameAction::AdvanceMonth, &mut env).state;

    // 50 wallet + 100 allowance, 50 savings + 1 interest
    let m = DerivedMetrics::from_state(&state, &EconomyConfig::default());
    assert_eq!(m.total_wealth, 201);
    assert_eq!(m.previous_wealth, 100);
    assert_eq!(m.monthly_change, 101);
    assert!((m.monthly_change_percent - 101.0).abs() < 1e-9);
    assert_eq!(m.months_remaining, 10);
}

#[test]
fn subscription_cost_sums_active_plans() {
    let mut env = env();
    let mut state = GameState::default();
    for id in ["spotify", "pokemon"] {
        let plan = subscription_item(id).expect("catalog entry");
        state = transition(&state, &plan.subscribe(), &mut env).state;
    }
    assert_eq!(DerivedMetrics::from_state(&state, &EconomyConfig::default()).monthly_subscription_cost, 13);
}

#[test]
fn nothing_remains_at_the_final_month() {
    let mut state = GameState::default();
    state.current_month = 12;
    assert_eq!(DerivedMetrics::from_state(&state, &EconomyConfig::default()).months_remaining, 0);
    assert_eq!(DerivedMetrics::with_final_month(&state, 6).months_remaining, 0);
    assert_eq!(DerivedMetrics::with_final_month(&state, 24).months_remaining, 12);
}

#[test]
fn months_remaining_follow_the_configured_year() {
    let config = EconomyConfig { final_month: 6, ..EconomyConfig::default() };
    let mut state = GameState::initial(&config);
    state.current_month = 4;
    assert_eq!(DerivedMetrics::from_state(&state, &config).months_remaining, 2);
}

#[test]
fn metrics_never_mutate_the_snapshot() {
    let state = GameState::default();
    let before = serde_json::to_string(&state).unwrap();
    let _ = DerivedMetrics::from_state(&state, &EconomyConfig::default());
    assert_eq!(serde_json::to_string(&state).unwrap(), before);
}
