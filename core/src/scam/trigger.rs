//! Click-counting scam trigger.
//!
//! Every `click_threshold` clicks the counter resets to zero and a timer
//! task is spawned. When it expires it sends a ScheduledTrigger carrying
//! the controller's generation at scheduling time; the owner feeds it back
//! through `fire`. Closing, resolving or resetting bumps the generation
//! and aborts the timer, so a stale trigger can never surface a scenario.
//!
//! `track_click` spawns onto the ambient Tokio runtime and panics outside one.

use super::catalog::{CallScam, PopupScam, CALL_SCAMS, POPUP_SCAMS};
use crate::{action::GameAction, config::ScamConfig, rng::SimRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "phase", content = "scenario", rename_all = "snake_case")]
pub enum ScamPhase {
    Idle,
    PopupActive(&'static PopupScam),
    CallActive(&'static CallScam),
}

impl ScamPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn scenario_id(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::PopupActive(p) => Some(p.id),
            Self::CallActive(c) => Some(c.id),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScamChoice {
    FellForIt,
    AvoidedIt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTrigger {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Counter after this click, still below the threshold.
    Counted(u32),
    /// Threshold reached; a timer is now running.
    Scheduled,
    /// Threshold reached while a timer was already running.
    AlreadyPending,
}

pub struct ScamTrigger {
    config:      ScamConfig,
    rng:         SimRng,
    phase:       ScamPhase,
    click_count: u32,
    generation:  u64,
    pending:     Option<JoinHandle<()>>,
    tx:          mpsc::UnboundedSender<ScheduledTrigger>,
}

impl ScamTrigger {
    /// Build a trigger and the receiver its timers report to.
    pub fn new(
        config: ScamConfig,
        rng: SimRng,
    ) -> (Self, mpsc::UnboundedReceiver<ScheduledTrigger>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let trigger = Self {
            config,
            rng,
            phase: ScamPhase::Idle,
            click_count: 0,
            generation: 0,
            pending: None,
            tx,
        };
        (trigger, rx)
    }

    pub fn phase(&self) -> ScamPhase {
        self.phase
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn active_popup(&self) -> Option<&'static PopupScam> {
        match self.phase {
            ScamPhase::PopupActive(p) => Some(p),
            _ => None,
        }
    }

    pub fn active_call(&self) -> Option<&'static CallScam> {
        match self.phase {
            ScamPhase::CallActive(c) => Some(c),
            _ => None,
        }
    }

    /// Count one UI click. The counter resets the moment it reaches the
    /// threshold, before the timer runs.
    pub fn track_click(&mut self) -> ClickOutcome {
        self.click_count += 1;
        if self.click_count < self.config.click_threshold {
            return ClickOutcome::Counted(self.click_count);
        }
        self.click_count = 0;

        if self.has_pending() {
            return ClickOutcome::AlreadyPending;
        }
        self.schedule();
        ClickOutcome::Scheduled
    }

    fn schedule(&mut self) {
        let trigger = ScheduledTrigger { generation: self.generation };
        let delay = Duration::from_millis(self.config.trigger_delay_ms);
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session is shutting down.
            let _ = tx.send(trigger);
        }));
        log::debug!("scam trigger scheduled (generation {})", self.generation);
    }

    /// Handle an expired timer. Returns the new phase if a scenario surfaced.
    pub fn fire(&mut self, trigger: ScheduledTrigger) -> Option<ScamPhase> {
        if trigger.generation != self.generation {
            log::debug!(
                "dropping stale scam trigger (generation {} != {})",
                trigger.generation,
                self.generation
            );
            return None;
        }
        self.pending = None;
        if !self.phase.is_idle() {
            return None;
        }
        Some(self.trigger_random())
    }

    /// Fair coin between a popup and a call.
    pub fn trigger_random(&mut self) -> ScamPhase {
        if self.rng.chance(0.5) {
            self.trigger_call()
        } else {
            self.trigger_popup()
        }
    }

    pub fn trigger_popup(&mut self) -> ScamPhase {
        let scam = &POPUP_SCAMS[self.rng.pick(POPUP_SCAMS.len())];
        self.phase = ScamPhase::PopupActive(scam);
        self.phase
    }

    pub fn trigger_call(&mut self) -> ScamPhase {
        let scam = &CALL_SCAMS[self.rng.pick(CALL_SCAMS.len())];
        self.phase = ScamPhase::CallActive(scam);
        self.phase
    }

    /// Settle the active scenario and return the action the engine must apply.
    pub fn resolve(&mut self, choice: ScamChoice) -> Option<GameAction> {
        if self.phase.is_idle() {
            return None;
        }
        self.return_to_idle();
        Some(match choice {
            ScamChoice::FellForIt => GameAction::ScamFellFor { penalty: self.config.penalty },
            ScamChoice::AvoidedIt => GameAction::ScamAvoided,
        })
    }

    /// Dismiss the active scenario without an outcome.
    pub fn close(&mut self) {
        self.return_to_idle();
    }

    /// Forget everything: phase, clicks and any running timer.
    pub fn reset(&mut self) {
        self.return_to_idle();
        self.click_count = 0;
    }

    fn return_to_idle(&mut self) {
        self.phase = ScamPhase::Idle;
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for ScamTrigger {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rng::{RngBank, RngSlot},
        scam::catalog::{call_scam, popup_scam},
    };

    fn trigger() -> (ScamTrigger, mpsc::UnboundedReceiver<ScheduledTrigger>) {
        ScamTrigger::new(ScamConfig::default(), RngBank::new(3).for_slot(RngSlot::Scam))
    }

    #[test]
    fn resolve_maps_choice_to_action() {
        let (mut t, _rx) = trigger();
        t.trigger_popup();
        assert_eq!(t.resolve(ScamChoice::FellForIt), Some(GameAction::ScamFellFor { penalty: 25 }));
        assert!(t.phase().is_idle());

        t.trigger_call();
        assert_eq!(t.resolve(ScamChoice::AvoidedIt), Some(GameAction::ScamAvoided));
        assert_eq!(t.resolve(ScamChoice::AvoidedIt), None, "nothing left to resolve");
    }

    #[test]
    fn direct_triggers_pick_from_their_catalog() {
        let (mut t, _rx) = trigger();
        for _ in 0..20 {
            assert!(t.trigger_popup().scenario_id().and_then(popup_scam).is_some());
            assert!(t.trigger_call().scenario_id().and_then(call_scam).is_some());
        }
        t.close();
        assert_eq!(t.active_popup(), None);
        assert_eq!(t.active_call(), None);
    }
}
