//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Object not found.
    #[error("{resource_type} not found: {id}")]
    NotFound {
        /// Class of the object.
        resource_type: String,
        /// Id or name that was looked up.
        id: String,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store error.
    #[error(transparent)]
    Storage(#[from] ig_storage::StorageError),

    /// XML error.
    #[error("XML error: {0}")]
    Xml(#[from] ig_xml::XmlError),

    /// Task or rule error.
    #[error(transparent)]
    Spi(#[from] ig_spi::SpiError),

    /// Domain error.
    #[error(transparent)]
    Model(#[from] ig_model::ModelError),

    /// Operation cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl CliError {
    /// Creates a not-found error.
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl From<ig_core::Error> for CliError {
    fn from(err: ig_core::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
