//! Error types for NotesAI.

use thiserror::Error;

/// Result type alias using NotesAI's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for NotesAI operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Required input was blank or malformed. Raised before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Durable store operation failed (network, permission, constraint).
    #[error("Repository error: {0}")]
    Repository(String),

    /// Database driver error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Identity service rejected the request.
    #[error("Auth error: {0}")]
    Auth(String),

    /// A mutation was attempted with no signed-in identity.
    #[error("Not signed in")]
    Unauthenticated,

    /// Completion service failed or returned empty output.
    #[error("Generation error: {0}")]
    Generation(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures caught locally before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True for failures that originated in the durable store.
    pub fn is_repository(&self) -> bool {
        matches!(self, Error::Repository(_) | Error::Database(_))
    }

    /// Shorthand for building a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
