//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the storage layout or the index database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage root unavailable: {0}")]
    Unavailable(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Video already indexed: {0}")]
    DuplicateVideo(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt index row: {0}")]
    CorruptRow(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn corrupt_row(msg: impl Into<String>) -> Self {
        Self::CorruptRow(msg.into())
    }
}
