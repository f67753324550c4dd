use thiserror::Error;

/// Plumbing errors. Gameplay validation failures ("can't afford it",
/// occupied cell, unknown id) are never errors; operations return
/// `false` or do nothing instead.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Snapshot migration from version {from} failed: {reason}")]
    Migration { from: u32, reason: String },

    #[error("Snapshot writer has shut down")]
    WriterClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
