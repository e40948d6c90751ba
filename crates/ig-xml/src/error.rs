//! XML codec error types.

use ig_model::ModelError;
use thiserror::Error;

/// Result type for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;

/// Errors raised while reading or writing object XML.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document is not well-formed XML.
    #[error("XML parsing error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// Writing the document failed.
    #[error("XML write error: {0}")]
    Write(#[from] std::io::Error),

    /// The document is well-formed but not shaped like an object document.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The document has no root element.
    #[error("document is empty")]
    Empty,

    /// An element other than the expected one was found.
    #[error("unexpected element <{found}>, expected <{expected}>")]
    UnexpectedElement {
        /// Element name expected.
        expected: String,
        /// Element name found.
        found: String,
    },

    /// The element does not name a known object class.
    #[error("unknown object element <{0}>")]
    UnknownElement(String),

    /// A required attribute is missing.
    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: &'static str,
    },

    /// A value could not be parsed.
    #[error("invalid value for {field}: '{value}'")]
    InvalidValue {
        /// Field or attribute name.
        field: String,
        /// Offending text.
        value: String,
    },

    /// The model rejected a decoded value.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl XmlError {
    /// Creates a malformed-document error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an unexpected element error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedElement {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(quick_xml::Error::from(err))
    }
}

impl From<XmlError> for ig_core::Error {
    fn from(err: XmlError) -> Self {
        match err {
            XmlError::Write(_) => Self::Internal,
            XmlError::Model(e) => e.into(),
            other => Self::Serialization(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_core() {
        let err: ig_core::Error = XmlError::Empty.into();
        assert!(matches!(err, ig_core::Error::Serialization(_)));
        assert!(err.is_client_error());

        let err = XmlError::unexpected("Identity", "Bundle");
        assert_eq!(err.to_string(), "unexpected element <Bundle>, expected <Identity>");
    }
}
