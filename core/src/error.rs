use crate::engine::Outcome;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session '{session_id}' not found in journal")]
    SessionNotFound { session_id: String },

    /// The action took effect but its journal rows could not be written.
    #[error("Action applied but not journaled: {source}")]
    NotJournaled {
        outcome: Outcome,
        #[source]
        source:  Box<GameError>,
    },

    #[error("Session task has shut down")]
    SessionClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
