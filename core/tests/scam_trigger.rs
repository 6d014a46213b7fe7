//! Scam trigger timing, run on a paused Tokio clock.

use piggy_core::{
    action::GameAction,
    config::ScamConfig,
    rng::{RngBank, RngSlot},
    scam::{ClickOutcome, ScamChoice, ScamPhase, ScamTrigger, ScheduledTrigger},
};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn trigger(seed: u64) -> (ScamTrigger, UnboundedReceiver<ScheduledTrigger>) {
    ScamTrigger::new(ScamConfig::default(), RngBank::new(seed).for_slot(RngSlot::Scam))
}

async fn past_delay() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test(start_paused = true)]
async fn fourth_click_does_not_schedule_a_second_trigger() {
    let (mut t, mut rx) = trigger(1);

    assert_eq!(t.track_click(), ClickOutcome::Counted(1));
    assert_eq!(t.track_click(), ClickOutcome::Counted(2));
    assert_eq!(t.track_click(), ClickOutcome::Scheduled);
    assert_eq!(t.click_count(), 0);
    assert_eq!(t.track_click(), ClickOutcome::Counted(1));

    past_delay().await;
    let fired = rx.recv().await.expect("one trigger");
    let phase = t.fire(fired).expect("scenario surfaces");
    assert!(!phase.is_idle());
    assert!(rx.try_recv().is_err(), "exactly one trigger");
}

#[tokio::test(start_paused = true)]
async fn threshold_while_pending_reports_already_pending() {
    let (mut t, mut rx) = trigger(2);
    for _ in 0..3 {
        t.track_click();
    }
    assert!(t.has_pending());
    t.track_click();
    t.track_click();
    assert_eq!(t.track_click(), ClickOutcome::AlreadyPending);

    past_delay().await;
    assert!(rx.recv().await.is_some());
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_the_pending_timer() {
    let (mut t, mut rx) = trigger(3);
    for _ in 0..3 {
        t.track_click();
    }
    t.reset();
    assert!(!t.has_pending());

    past_delay().await;
    assert!(rx.try_recv().is_err(), "aborted timer never reports");
    assert_eq!(t.phase(), ScamPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stale_trigger_is_dropped() {
    let (mut t, mut rx) = trigger(4);
    for _ in 0..3 {
        t.track_click();
    }
    past_delay().await;
    let fired = rx.recv().await.expect("timer reported");

    // Moving on before the owner handles the trigger invalidates it.
    t.close();
    assert_eq!(t.fire(fired), None);
    assert!(t.phase().is_idle());
}

#[tokio::test(start_paused = true)]
async fn trigger_during_active_scenario_is_swallowed() {
    let (mut t, mut rx) = trigger(5);
    for _ in 0..3 {
        t.track_click();
    }
    let active = t.trigger_popup();

    past_delay().await;
    let fired = rx.recv().await.expect("timer reported");
    assert_eq!(t.fire(fired), None);
    assert_eq!(t.phase(), active);
    assert!(!t.has_pending());
}

#[tokio::test(start_paused = true)]
async fn resolving_yields_the_engine_action() {
    let (mut t, mut rx) = trigger(6);
    for _ in 0..3 {
        t.track_click();
    }
    past_delay().await;
    let fired = rx.recv().await.expect("timer reported");
    t.fire(fired).expect("scenario surfaces");

    assert_eq!(t.resolve(ScamChoice::FellForIt), Some(GameAction::ScamFellFor { penalty: 25 }));
    assert!(t.phase().is_idle());
}

#[test]
fn same_seed_picks_the_same_scenarios() {
    let (mut a, _ra) = trigger(99);
    let (mut b, _rb) = trigger(99);
    for _ in 0..10 {
        assert_eq!(a.trigger_random().scenario_id(), b.trigger_random().scenario_id());
    }
}
