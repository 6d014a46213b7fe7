//! Session events: what happened, in order, for logs and the journal.
//!
//! RULE: Events describe effects; they never drive state. The engine's
//! transition is the only source of truth, events are derived from it.

use crate::{
    engine::RejectReason,
    scam::ScamChoice,
    types::{Money, Month, SessionId},
};
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        session_id: SessionId,
        seed: u64,
    },
    ActionApplied {
        month: Month,
        action: String,
    },
    ActionRejected {
        month: Month,
        action: String,
        reason: RejectReason,
    },
    ActionIgnored {
        month: Month,
        action: String,
    },
    MonthAdvanced {
        month: Month,
        wallet: Money,
        savings: Money,
        investments: Money,
        total_wealth: Money,
    },
    GameEnded {
        final_wealth: Money,
        scams_avoided: u32,
        scams_fell_for: u32,
    },
    SessionReset,
    ScamSurfaced {
        month: Month,
        scenario_id: String,
        channel: String, // "popup" | "call"
    },
    ScamResolved {
        month: Month,
        scenario_id: String,
        choice: ScamChoice,
    },
}

impl SessionEvent {
    /// Stable name for the event_type journal column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::ActionApplied { .. }  => "action_applied",
            Self::ActionRejected { .. } => "action_rejected",
            Self::ActionIgnored { .. }  => "action_ignored",
            Self::MonthAdvanced { .. }  => "month_advanced",
            Self::GameEnded { .. }      => "game_ended",
            Self::SessionReset          => "session_reset",
            Self::ScamSurfaced { .. }   => "scam_surfaced",
            Self::ScamResolved { .. }   => "scam_resolved",
        }
    }
}

/// A journal row as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id:         Option<i64>,
    pub session_id: SessionId,
    pub seq:        u64,
    pub month:      Month,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SessionEvent
}

/// One dispatched action as persisted to SQLite, enough to replay a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub session_id: SessionId,
    pub seq:        u64,
    pub month:      Month,
    pub action:     String, // JSON-serialized GameAction
    pub outcome:    String, // JSON-serialized Outcome
}
