//! Piggy, the money-buddy companion: boundary to the text-generation and
//! speech services.
//!
//! RULE: Nothing in here can fail the game. Service errors become
//! fallback replies or a failed playback, and the companion only ever
//! reads GameState snapshots.

pub mod chat;
pub mod prompt;
pub mod voice;

use thiserror::Error;

pub use chat::{Companion, GeminiClient, TextGenerator};
pub use prompt::{ChatMessage, ChatRole};
pub use voice::{
    AudioSink, Capability, ElevenLabsClient, Listener, NoRecognizer, NullSink, Playback,
    SpeechRecognizer, SpeechSynthesizer, Transcript, Voice, VoiceOutcome,
};

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("{service} API key is not configured")]
    MissingApiKey { service: &'static str },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status:  u16,
        body:    String,
    },

    #[error("unexpected response shape from {service}")]
    MalformedResponse { service: &'static str },

    #[error("{0}")]
    Unsupported(String),

    #[error("playback failed: {0}")]
    Playback(String),
}
