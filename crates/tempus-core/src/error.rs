//! Error types for tempus-core

use thiserror::Error;

/// Result type alias using tempus-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tempus-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local store error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network failure or non-2xx response from the sync server
    #[error("Remote error: {0}")]
    Remote(String),

    /// Unexpected or malformed remote payload
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Network errors are treated uniformly; the sync engine only needs to know
// that the pass must abort and be retried later.
impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Remote(error.to_string())
    }
}
