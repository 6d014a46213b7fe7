//! The session actor: serialized dispatch, published snapshots and the
//! scam trigger wired beside the state.

use piggy_core::{
    action::GameAction,
    config::GameConfig,
    engine::{Outcome, RejectReason},
    error::GameError,
    scam::{ClickOutcome, ScamChoice},
    session::{self, GameSession},
    state::GameState,
    store::GameStore,
};
use std::{collections::HashSet, time::Duration};

fn new_session(id: &str, seed: u64) -> GameSession {
    GameSession::new(id.to_string(), seed, GameConfig::default())
}

fn journaled_session(id: &str, seed: u64) -> GameSession {
    let store = GameStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    new_session(id, seed).with_store(store).expect("journal attached")
}

#[tokio::test]
async fn dispatch_publishes_a_new_snapshot() {
    let (handle, _task) = session::spawn(new_session("snap", 1));
    let mut states = handle.subscribe();
    let before = handle.snapshot();

    let outcome = handle.dispatch(GameAction::buy("Candy", 5, "🍬")).await.unwrap();
    assert_eq!(outcome, Outcome::Applied);

    states.changed().await.unwrap();
    assert_eq!(states.borrow().wallet, 95);
    assert_eq!(handle.snapshot().wallet, 95);
    assert_eq!(before.wallet, 100, "old snapshots are never mutated");
}

#[tokio::test]
async fn rejected_dispatch_reports_reason() {
    let (handle, _task) = session::spawn(new_session("reject", 1));
    let outcome = handle.dispatch(GameAction::buy("iPhone", 500, "📱")).await.unwrap();
    assert_eq!(outcome, Outcome::Rejected(RejectReason::InsufficientFunds));
    assert_eq!(*handle.snapshot(), GameState::default());
}

#[tokio::test]
async fn concurrent_dispatches_are_serialized() {
    let (handle, _task) = session::spawn(new_session("many", 1));

    let buyers: Vec<_> = (0..10)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.dispatch(GameAction::buy("Candy", 5, "🍬")).await })
        })
        .collect();
    for buyer in buyers {
        assert_eq!(buyer.await.unwrap().unwrap(), Outcome::Applied);
    }

    let state = handle.snapshot();
    assert_eq!(state.wallet, 50);
    assert_eq!(state.total_spent, 50);
    let ids: HashSet<_> = state.transactions.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn clicks_surface_a_scam_through_the_actor() {
    let (handle, _task) = session::spawn(new_session("clicks", 5));
    let mut phases = handle.subscribe_scam();

    assert_eq!(handle.track_click().await.unwrap(), ClickOutcome::Counted(1));
    assert_eq!(handle.track_click().await.unwrap(), ClickOutcome::Counted(2));
    assert_eq!(handle.track_click().await.unwrap(), ClickOutcome::Scheduled);

    phases.changed().await.unwrap();
    assert!(!handle.scam_phase().is_idle());

    let outcome = handle.resolve_scam(ScamChoice::FellForIt).await.unwrap();
    assert_eq!(outcome, Some(Outcome::Applied));
    let state = handle.snapshot();
    assert_eq!(state.wallet, 75);
    assert_eq!(state.scams_fell_for, 1);
    assert!(handle.scam_phase().is_idle());

    assert_eq!(handle.resolve_scam(ScamChoice::AvoidedIt).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn reset_also_cancels_a_pending_scam() {
    let (handle, task) = session::spawn(journaled_session("reset", 7));

    for _ in 0..3 {
        handle.track_click().await.unwrap();
    }
    handle.dispatch(GameAction::ResetGame).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(handle.scam_phase().is_idle());
    assert_eq!(*handle.snapshot(), GameState::default());

    handle.shutdown().await.unwrap();
    let game = task.await.unwrap();
    let store = game.store().expect("journal attached");
    assert_eq!(store.event_count("reset", "scam_surfaced").unwrap(), 0);
    assert_eq!(store.event_count("reset", "session_reset").unwrap(), 1);
}

#[tokio::test]
async fn manual_triggers_and_close() {
    let (handle, _task) = session::spawn(new_session("manual", 3));

    let popup = handle.trigger_popup().await.unwrap();
    assert!(popup.scenario_id().is_some());
    handle.close_scam().await.unwrap();

    let call = handle.trigger_call().await.unwrap();
    assert_eq!(handle.scam_phase(), call);
    assert_eq!(handle.resolve_scam(ScamChoice::AvoidedIt).await.unwrap(), Some(Outcome::Applied));
    assert_eq!(handle.snapshot().scams_avoided, 1);
}

#[tokio::test]
async fn shutdown_hands_the_session_back() {
    let (handle, task) = session::spawn(new_session("bye", 1));
    handle.dispatch(GameAction::StartGame).await.unwrap();
    handle.shutdown().await.unwrap();

    let game = task.await.unwrap();
    assert!(game.snapshot().game_started);

    let err = handle.dispatch(GameAction::AdvanceMonth).await.unwrap_err();
    assert!(matches!(err, GameError::SessionClosed));

    // A returned session can be spawned again.
    let (again, _task) = session::spawn(game);
    assert_eq!(again.dispatch(GameAction::AdvanceMonth).await.unwrap(), Outcome::Applied);
    assert_eq!(again.snapshot().current_month, 2);
}

#[tokio::test]
async fn handle_metrics_follow_snapshots() {
    let (handle, _task) = session::spawn(new_session("metrics", 1));
    handle.dispatch(GameAction::TransferToSavings { amount: 40 }).await.unwrap();
    handle.dispatch(GameAction::AdvanceMonth).await.unwrap();

    let m = handle.metrics();
    assert_eq!(m.total_wealth, handle.snapshot().total_wealth());
    assert_eq!(m.months_remaining, 10);
}
