//! Top-level error handling.
//!
//! Each crate keeps its own error enum (`ModelError`, `StorageError`,
//! `XmlError`, ...). This type is what tools surface to operators once the
//! detail has been logged.

use thiserror::Error;

/// Result type alias using the workspace error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for object-model operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error (XML or JSON).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// A business precondition was violated (self certification,
    /// reassignment limits, bad escalation targets).
    #[error("{0}")]
    Precondition(String),

    /// Object not found.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Object already exists.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Config(_) | Self::Internal)
    }

    /// Returns whether this error was caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Serialization(_)
                | Self::Validation(_)
                | Self::Precondition(_)
                | Self::NotFound(_)
                | Self::AlreadyExists(_)
        )
    }
}
