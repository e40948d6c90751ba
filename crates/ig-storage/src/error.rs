//! Storage error types.

use ig_model::{ModelError, ObjectClass};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object not found.
    #[error("object not found: {class} with id {id}")]
    NotFound {
        /// Class of the object.
        class: ObjectClass,
        /// Object id.
        id: String,
    },

    /// Object not found by name.
    #[error("object not found: {class} with name '{name}'")]
    NotFoundByName {
        /// Class of the object.
        class: ObjectClass,
        /// Object name.
        name: String,
    },

    /// Duplicate object (uniqueness violation).
    #[error("duplicate {class}: {field} '{value}' already exists")]
    Duplicate {
        /// Class of the object.
        class: ObjectClass,
        /// Field that caused the conflict.
        field: &'static str,
        /// Conflicting value.
        value: String,
    },

    /// A class name did not match any object class.
    #[error("unknown object class: {0}")]
    UnknownClass(String),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The model rejected an operation.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Reading or writing the store file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(class: ObjectClass, id: impl Into<String>) -> Self {
        Self::NotFound {
            class,
            id: id.into(),
        }
    }

    /// Creates a not found by name error.
    #[must_use]
    pub fn not_found_by_name(class: ObjectClass, name: impl Into<String>) -> Self {
        Self::NotFoundByName {
            class,
            name: name.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(class: ObjectClass, field: &'static str, value: impl Into<String>) -> Self {
        Self::Duplicate {
            class,
            field,
            value: value.into(),
        }
    }

    /// Creates an unknown class error.
    #[must_use]
    pub fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass(name.into())
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NotFoundByName { .. })
    }

    /// Checks if this is a duplicate error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<StorageError> for ig_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } | StorageError::NotFoundByName { .. } => {
                Self::NotFound(err.to_string())
            }
            StorageError::Duplicate { .. } => Self::AlreadyExists(err.to_string()),
            StorageError::UnknownClass(_) | StorageError::InvalidData(_) => {
                Self::Validation(err.to_string())
            }
            StorageError::Model(model) => model.into(),
            StorageError::Serialization(msg) => Self::Serialization(msg),
            StorageError::Io(_) | StorageError::Internal(_) => Self::Storage(err.to_string()),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
