//! Error type for extension-point operations.

use ig_storage::StorageError;
use thiserror::Error;

/// Errors raised by rule runners, task executors and the registry.
#[derive(Debug, Error)]
pub enum SpiError {
    /// No executor is registered under the name.
    #[error("executor not found: {0}")]
    ExecutorNotFound(String),

    /// An executor is already registered under the name.
    #[error("executor already registered: {0}")]
    AlreadyRegistered(String),

    /// The task definition does not name an executor.
    #[error("task definition '{0}' has no executor")]
    NoExecutor(String),

    /// No rule implementation is registered under the name.
    #[error("rule not found: {0}")]
    RuleNotFound(String),

    /// A rule ran but failed.
    #[error("rule '{rule}' failed: {reason}")]
    RuleFailed {
        /// Rule name.
        rule: String,
        /// Why it failed.
        reason: String,
    },

    /// A task argument was missing or malformed.
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// The store rejected an operation.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SpiError {
    /// Creates a rule failure.
    #[must_use]
    pub fn rule_failed(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RuleFailed {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<SpiError> for ig_core::Error {
    fn from(err: SpiError) -> Self {
        match err {
            SpiError::Storage(storage) => storage.into(),
            SpiError::ExecutorNotFound(_) | SpiError::RuleNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            SpiError::AlreadyRegistered(_) => Self::AlreadyExists(err.to_string()),
            SpiError::NoExecutor(_) | SpiError::InvalidArgument { .. } => {
                Self::Validation(err.to_string())
            }
            SpiError::RuleFailed { .. } => Self::Internal,
        }
    }
}

/// Result type for extension-point operations.
pub type SpiResult<T> = Result<T, SpiError>;
