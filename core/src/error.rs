use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Malformed match '{match_id}': {reason}")]
    MalformedMatch { match_id: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DuelResult<T> = Result<T, DuelError>;
