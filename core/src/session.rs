//! The game session: single owner of GameState.
//!
//! RULES:
//!   - Only GameSession calls engine::transition, one action at a time.
//!   - Readers get `Arc<GameState>` snapshots, never a mutable reference.
//!   - The scam trigger lives beside the state, not inside it. Its
//!     outcomes reach the state only as dispatched actions.
//!   - A ResetGame also resets the scam trigger, cancelling any timer.
//!
//! `spawn` moves a session onto its own task. Every request funnels
//! through one queue, which is what serializes dispatches.

use crate::{
    action::GameAction,
    config::GameConfig,
    engine::{transition, EngineEnv, Outcome},
    error::{GameError, GameResult},
    event::{ActionRecord, JournalEntry, SessionEvent},
    metrics::DerivedMetrics,
    rng::{RngBank, RngSlot},
    scam::{ClickOutcome, ScamChoice, ScamPhase, ScamTrigger, ScheduledTrigger},
    state::GameState,
    store::GameStore,
    types::{Month, SessionId},
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

pub struct GameSession {
    pub session_id: SessionId,
    seed:           u64,
    config:         GameConfig,
    state:          Arc<GameState>,
    env:            EngineEnv,
    scam:           ScamTrigger,
    scam_timers:    mpsc::UnboundedReceiver<ScheduledTrigger>,
    store:          Option<GameStore>,
    seq:            u64,
    state_tx:       watch::Sender<Arc<GameState>>,
    scam_tx:        watch::Sender<ScamPhase>,
}

impl GameSession {
    pub fn new(session_id: SessionId, seed: u64, config: GameConfig) -> Self {
        let bank = RngBank::new(seed);
        let env = EngineEnv::seeded(config.economy.clone(), &bank);
        let (scam, scam_timers) =
            ScamTrigger::new(config.scam.clone(), bank.for_slot(RngSlot::Scam));
        let state = Arc::new(GameState::initial(&config.economy));
        let (state_tx, _) = watch::channel(Arc::clone(&state));
        let (scam_tx, _) = watch::channel(ScamPhase::Idle);

        Self {
            session_id,
            seed,
            config,
            state,
            env,
            scam,
            scam_timers,
            store: None,
            seq: 0,
            state_tx,
            scam_tx,
        }
    }

    /// Swap in a custom engine environment (pinned market, other id source).
    pub fn with_engine_env(mut self, env: EngineEnv) -> Self {
        self.env = env;
        self
    }

    /// Journal every action and event of this session to `store`.
    pub fn with_store(mut self, store: GameStore) -> GameResult<Self> {
        store.insert_session(&self.session_id, self.seed, env!("CARGO_PKG_VERSION"))?;
        self.store = Some(store);
        let started = SessionEvent::SessionStarted {
            session_id: self.session_id.clone(),
            seed: self.seed,
        };
        self.journal_events(&[started])?;
        Ok(self)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&GameStore> {
        self.store.as_ref()
    }

    pub fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&self.state)
    }

    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics::from_state(&self.state, &self.config.economy)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_scam(&self) -> watch::Receiver<ScamPhase> {
        self.scam_tx.subscribe()
    }

    pub fn scam_phase(&self) -> ScamPhase {
        self.scam.phase()
    }

    /// Run one action through the engine and publish the result.
    ///
    /// The new state is committed and published before it is journaled.
    /// A journal failure comes back as `NotJournaled`, carrying the
    /// outcome that was applied.
    pub fn dispatch(&mut self, action: GameAction) -> GameResult<Outcome> {
        let before = Arc::clone(&self.state);
        let result = transition(&before, &action, &mut self.env);
        let outcome = result.outcome;
        self.seq += 1;

        log::debug!(
            "seq={} month={} action={} outcome={:?}",
            self.seq,
            before.current_month,
            action.name(),
            outcome
        );

        let events = describe(&before, &result.state, &action, outcome);
        self.state = Arc::new(result.state);

        if matches!(action, GameAction::ResetGame) && outcome.is_applied() {
            self.scam.reset();
            self.scam_tx.send_replace(self.scam.phase());
        }
        self.state_tx.send_replace(Arc::clone(&self.state));

        self.journal_dispatch(&action, outcome, before.current_month, &events)
            .map_err(|e| {
                log::warn!("{}: seq {} not journaled: {e}", self.session_id, self.seq);
                GameError::NotJournaled { outcome, source: Box::new(e) }
            })?;
        Ok(outcome)
    }

    // ── Scam trigger ───────────────────────────────────────────

    /// Count a UI click. Needs a Tokio runtime when the threshold is hit.
    pub fn track_click(&mut self) -> ClickOutcome {
        self.scam.track_click()
    }

    /// Feed back an expired timer; surfaces a scenario if still relevant.
    pub fn fire_scheduled(&mut self, trigger: ScheduledTrigger) -> GameResult<Option<ScamPhase>> {
        match self.scam.fire(trigger) {
            Some(phase) => {
                self.on_surfaced(phase)?;
                Ok(Some(phase))
            }
            None => Ok(None),
        }
    }

    pub fn trigger_popup(&mut self) -> GameResult<ScamPhase> {
        let phase = self.scam.trigger_popup();
        self.on_surfaced(phase)?;
        Ok(phase)
    }

    pub fn trigger_call(&mut self) -> GameResult<ScamPhase> {
        let phase = self.scam.trigger_call();
        self.on_surfaced(phase)?;
        Ok(phase)
    }

    /// Settle the active scenario. Returns the engine outcome of the
    /// resulting action, or None when no scenario was active.
    pub fn resolve_scam(&mut self, choice: ScamChoice) -> GameResult<Option<Outcome>> {
        let scenario_id = self.scam.phase().scenario_id();
        let Some(action) = self.scam.resolve(choice) else {
            return Ok(None);
        };
        self.scam_tx.send_replace(self.scam.phase());

        if let Some(scenario_id) = scenario_id {
            let resolved = SessionEvent::ScamResolved {
                month: self.state.current_month,
                scenario_id: scenario_id.to_string(),
                choice,
            };
            self.journal_events(&[resolved])?;
        }
        self.dispatch(action).map(Some)
    }

    pub fn close_scam(&mut self) {
        self.scam.close();
        self.scam_tx.send_replace(self.scam.phase());
    }

    fn on_surfaced(&mut self, phase: ScamPhase) -> GameResult<()> {
        self.scam_tx.send_replace(phase);
        let channel = match phase {
            ScamPhase::Idle => return Ok(()),
            ScamPhase::PopupActive(_) => "popup",
            ScamPhase::CallActive(_) => "call",
        };
        let surfaced = SessionEvent::ScamSurfaced {
            month: self.state.current_month,
            scenario_id: phase.scenario_id().unwrap_or_default().to_string(),
            channel: channel.to_string(),
        };
        self.journal_events(&[surfaced])
    }

    // ── Journal ────────────────────────────────────────────────

    fn journal_dispatch(
        &self,
        action: &GameAction,
        outcome: Outcome,
        month: Month,
        events: &[SessionEvent],
    ) -> GameResult<()> {
        if let Some(store) = &self.store {
            store.append_action(&ActionRecord {
                session_id: self.session_id.clone(),
                seq:        self.seq,
                month,
                action:     serde_json::to_string(action)?,
                outcome:    serde_json::to_string(&outcome)?,
            })?;
        }
        self.journal_events(events)?;
        if matches!(action, GameAction::AdvanceMonth) && outcome.is_applied() {
            self.save_snapshot()?;
        }
        Ok(())
    }

    fn journal_events(&self, events: &[SessionEvent]) -> GameResult<()> {
        for event in events {
            match event {
                SessionEvent::MonthAdvanced { month, total_wealth, .. } => {
                    log::info!("{}: month {month} begins, wealth ${total_wealth}", self.session_id);
                }
                SessionEvent::GameEnded { final_wealth, .. } => {
                    log::info!("{}: game over, final wealth ${final_wealth}", self.session_id);
                }
                other => log::debug!("{}: {}", self.session_id, other.type_name()),
            }

            if let Some(store) = &self.store {
                store.append_event(&JournalEntry {
                    id:         None,
                    session_id: self.session_id.clone(),
                    seq:        self.seq,
                    month:      self.state.current_month,
                    event_type: event.type_name().to_string(),
                    payload:    serde_json::to_string(event)?,
                })?;
            }
        }
        Ok(())
    }

    fn save_snapshot(&self) -> GameResult<()> {
        if let Some(store) = &self.store {
            let json = serde_json::to_string(self.state.as_ref())?;
            store.save_snapshot(&self.session_id, self.state.current_month, self.seq, &json)?;
        }
        Ok(())
    }

    /// Rebuild a session by replaying journaled actions against `seed`.
    pub fn replay(
        session_id: SessionId,
        seed: u64,
        config: GameConfig,
        records: &[ActionRecord],
    ) -> GameResult<Self> {
        let mut session = Self::new(session_id, seed, config);
        for record in records {
            let action: GameAction = serde_json::from_str(&record.action)?;
            session.dispatch(action)?;
        }
        Ok(session)
    }
}

/// Derive the events a transition produced.
fn describe(
    before: &GameState,
    after: &GameState,
    action: &GameAction,
    outcome: Outcome,
) -> Vec<SessionEvent> {
    let month = before.current_month;
    let name = action.name().to_string();
    let mut events = Vec::new();

    match outcome {
        Outcome::Rejected(reason) => {
            events.push(SessionEvent::ActionRejected { month, action: name, reason });
            return events;
        }
        Outcome::Ignored => {
            events.push(SessionEvent::ActionIgnored { month, action: name });
            return events;
        }
        Outcome::Applied => events.push(SessionEvent::ActionApplied { month, action: name }),
    }

    if matches!(action, GameAction::ResetGame) {
        events.push(SessionEvent::SessionReset);
    } else if after.current_month > before.current_month {
        events.push(SessionEvent::MonthAdvanced {
            month:        after.current_month,
            wallet:       after.wallet,
            savings:      after.savings,
            investments:  after.investments,
            total_wealth: after.total_wealth(),
        });
    } else if after.game_ended && !before.game_ended {
        events.push(SessionEvent::GameEnded {
            final_wealth:   after.total_wealth(),
            scams_avoided:  after.scams_avoided,
            scams_fell_for: after.scams_fell_for,
        });
    }
    events
}

// ── Async dispatch boundary ───────────────────────────────────────

enum Request {
    Dispatch {
        action: GameAction,
        reply:  oneshot::Sender<GameResult<Outcome>>,
    },
    TrackClick {
        reply: oneshot::Sender<ClickOutcome>,
    },
    ResolveScam {
        choice: ScamChoice,
        reply:  oneshot::Sender<GameResult<Option<Outcome>>>,
    },
    TriggerPopup {
        reply: oneshot::Sender<GameResult<ScamPhase>>,
    },
    TriggerCall {
        reply: oneshot::Sender<GameResult<ScamPhase>>,
    },
    CloseScam,
    Shutdown,
}

/// Cloneable front door to a spawned session.
#[derive(Clone)]
pub struct SessionHandle {
    requests:    mpsc::Sender<Request>,
    state_rx:    watch::Receiver<Arc<GameState>>,
    scam_rx:     watch::Receiver<ScamPhase>,
    final_month: Month,
}

/// Move `session` onto its own task. The join handle yields the session
/// back after `shutdown`.
pub fn spawn(session: GameSession) -> (SessionHandle, JoinHandle<GameSession>) {
    let (requests, inbox) = mpsc::channel(64);
    let handle = SessionHandle {
        requests,
        state_rx: session.subscribe(),
        scam_rx: session.subscribe_scam(),
        final_month: session.config.economy.final_month,
    };
    let task = tokio::spawn(run(session, inbox));
    (handle, task)
}

async fn run(
    mut session: GameSession,
    mut inbox: mpsc::Receiver<Request>,
) -> GameSession {
    loop {
        tokio::select! {
            request = inbox.recv() => {
                let Some(request) = request else { break };
                if !serve(&mut session, request) {
                    break;
                }
            }
            Some(trigger) = session.scam_timers.recv() => {
                if let Err(e) = session.fire_scheduled(trigger) {
                    log::warn!("{}: failed to surface scam: {e}", session.session_id);
                }
            }
        }
    }
    log::debug!("{}: session task stopped", session.session_id);
    session
}

/// Handle one request. Returns false on shutdown.
fn serve(session: &mut GameSession, request: Request) -> bool {
    // A dropped reply receiver only means the caller gave up waiting.
    match request {
        Request::Dispatch { action, reply } => {
            let _ = reply.send(session.dispatch(action));
        }
        Request::TrackClick { reply } => {
            let _ = reply.send(session.track_click());
        }
        Request::ResolveScam { choice, reply } => {
            let _ = reply.send(session.resolve_scam(choice));
        }
        Request::TriggerPopup { reply } => {
            let _ = reply.send(session.trigger_popup());
        }
        Request::TriggerCall { reply } => {
            let _ = reply.send(session.trigger_call());
        }
        Request::CloseScam => session.close_scam(),
        Request::Shutdown => return false,
    }
    true
}

impl SessionHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> GameResult<T> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(build(reply))
            .await
            .map_err(|_| GameError::SessionClosed)?;
        response.await.map_err(|_| GameError::SessionClosed)
    }

    pub async fn dispatch(&self, action: GameAction) -> GameResult<Outcome> {
        self.request(|reply| Request::Dispatch { action, reply }).await?
    }

    pub async fn track_click(&self) -> GameResult<ClickOutcome> {
        self.request(|reply| Request::TrackClick { reply }).await
    }

    pub async fn resolve_scam(&self, choice: ScamChoice) -> GameResult<Option<Outcome>> {
        self.request(|reply| Request::ResolveScam { choice, reply }).await?
    }

    pub async fn trigger_popup(&self) -> GameResult<ScamPhase> {
        self.request(|reply| Request::TriggerPopup { reply }).await?
    }

    pub async fn trigger_call(&self) -> GameResult<ScamPhase> {
        self.request(|reply| Request::TriggerCall { reply }).await?
    }

    pub async fn close_scam(&self) -> GameResult<()> {
        self.requests
            .send(Request::CloseScam)
            .await
            .map_err(|_| GameError::SessionClosed)
    }

    pub async fn shutdown(&self) -> GameResult<()> {
        self.requests
            .send(Request::Shutdown)
            .await
            .map_err(|_| GameError::SessionClosed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&self.state_rx.borrow())
    }

    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics::with_final_month(&self.snapshot(), self.final_month)
    }

    pub fn scam_phase(&self) -> ScamPhase {
        *self.scam_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.state_rx.clone()
    }

    pub fn subscribe_scam(&self) -> watch::Receiver<ScamPhase> {
        self.scam_rx.clone()
    }
}
