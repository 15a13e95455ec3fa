//! Error types for snapshot construction.

use thiserror::Error;

/// Main error type for snapshot operations.
///
/// Reading a path that does not exist is never an error; only malformed
/// input and missing collaborators are.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid resource format: {0}")]
    Format(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("No reference resolver attached to snapshot")]
    NoResolver,

    #[error("Handler error: {0}")]
    Handler(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Deserialization(e.to_string())
    }
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
