//! Scam scenarios and the click-driven trigger that surfaces them.
//!
//! The trigger lives outside GameState: only the outcome of a
//! scenario (ScamAvoided / ScamFellFor) ever reaches the engine.

pub mod catalog;
pub mod trigger;

pub use catalog::{CallScam, DangerLevel, DialogueLine, DialogueOption, PopupScam, Speaker};
pub use trigger::{ClickOutcome, ScamChoice, ScamPhase, ScamTrigger, ScheduledTrigger};
