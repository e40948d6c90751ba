//! Domain errors.
//!
//! Business preconditions raised by the model itself. Each variant carries
//! a message key and arguments so that callers with a message catalogue
//! can localize it; `Display` gives the default English text.

use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Message key for [`ModelError::SelfCertification`].
pub const MSG_SELF_CERTIFICATION: &str = "err_self_certification";
/// Message key for [`ModelError::LimitReassignment`].
pub const MSG_LIMIT_REASSIGNMENT: &str = "err_limit_reassignment";
/// Message key for [`ModelError::InvalidEscalationTarget`].
pub const MSG_INVALID_ESCALATION_TARGET: &str = "err_invalid_escalation_target";
/// Message key for [`ModelError::UnknownClass`].
pub const MSG_UNKNOWN_CLASS: &str = "err_unknown_class";
/// Message key for [`ModelError::ClassMismatch`].
pub const MSG_CLASS_MISMATCH: &str = "err_class_mismatch";
/// Message key for [`ModelError::InvalidValue`].
pub const MSG_INVALID_VALUE: &str = "err_invalid_value";

/// Errors raised by the object model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An identity tried to certify their own access.
    #[error("{identity} cannot certify their own access")]
    SelfCertification {
        /// Name of the identity.
        identity: String,
    },

    /// A certification item has been reassigned as often as allowed.
    #[error("reassignment limit reached")]
    LimitReassignment,

    /// A work item could not be escalated to the chosen owner.
    #[error("work item {item} cannot be escalated to {target}: {cause}")]
    InvalidEscalationTarget {
        /// Work item id or name.
        item: String,
        /// Name of the rejected owner.
        target: String,
        /// Why the target was rejected.
        cause: String,
    },

    /// A class name did not match any object class.
    #[error("unknown object class: {0}")]
    UnknownClass(String),

    /// An object of one class was used where another was required.
    #[error("expected {expected}, found {found}")]
    ClassMismatch {
        /// Class that was required.
        expected: String,
        /// Class that was supplied.
        found: String,
    },

    /// A field value was out of range or malformed.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Description of the problem.
        reason: String,
    },
}

impl ModelError {
    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the catalogue key for this error.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::SelfCertification { .. } => MSG_SELF_CERTIFICATION,
            Self::LimitReassignment => MSG_LIMIT_REASSIGNMENT,
            Self::InvalidEscalationTarget { .. } => MSG_INVALID_ESCALATION_TARGET,
            Self::UnknownClass(_) => MSG_UNKNOWN_CLASS,
            Self::ClassMismatch { .. } => MSG_CLASS_MISMATCH,
            Self::InvalidValue { .. } => MSG_INVALID_VALUE,
        }
    }

    /// Returns the message arguments in catalogue order.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::SelfCertification { identity } => vec![identity.clone()],
            Self::LimitReassignment => Vec::new(),
            Self::InvalidEscalationTarget {
                item,
                target,
                cause,
            } => vec![item.clone(), target.clone(), cause.clone()],
            Self::UnknownClass(class) => vec![class.clone()],
            Self::ClassMismatch { expected, found } => vec![expected.clone(), found.clone()],
            Self::InvalidValue { field, reason } => vec![field.clone(), reason.clone()],
        }
    }

    /// Returns whether this is a business precondition rather than a
    /// malformed input.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::SelfCertification { .. }
                | Self::LimitReassignment
                | Self::InvalidEscalationTarget { .. }
        )
    }
}

impl From<ModelError> for ig_core::Error {
    fn from(err: ModelError) -> Self {
        if err.is_precondition() {
            Self::Precondition(err.to_string())
        } else {
            Self::Validation(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_certification_message() {
        let err = ModelError::SelfCertification {
            identity: "Alan.Bradley".to_string(),
        };
        assert_eq!(err.to_string(), "Alan.Bradley cannot certify their own access");
        assert_eq!(err.message_key(), MSG_SELF_CERTIFICATION);
        assert_eq!(err.args(), vec!["Alan.Bradley".to_string()]);
    }

    #[test]
    fn escalation_target_args_in_order() {
        let err = ModelError::InvalidEscalationTarget {
            item: "0000000042".to_string(),
            target: "Amy.Cox".to_string(),
            cause: "target is inactive".to_string(),
        };
        assert_eq!(err.args(), vec!["0000000042", "Amy.Cox", "target is inactive"]);
        assert!(err.to_string().contains("Amy.Cox"));
    }

    #[test]
    fn converts_to_core_error() {
        let core: ig_core::Error = ModelError::LimitReassignment.into();
        assert!(matches!(core, ig_core::Error::Precondition(_)));

        let core: ig_core::Error = ModelError::UnknownClass("Widget".into()).into();
        assert!(matches!(core, ig_core::Error::Validation(_)));
    }
}
