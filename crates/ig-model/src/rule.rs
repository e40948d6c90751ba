//! Rule domain model.
//!
//! A rule is a named piece of logic that other objects reference (account
//! selection, correlation, policy evaluation). The model only stores it;
//! running it is up to a `RuleRunner`.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::object::{persistent_object, with_attributes, ObjectHeader};
use crate::reference::Reference;

/// Default rule language.
pub const DEFAULT_LANGUAGE: &str = "beanshell";

/// A piece of executable logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Common object fields.
    pub header: ObjectHeader,
    /// Script language; `None` means the default language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Rule type (e.g. "Correlation", "AccountSelector").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    /// Source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Rule libraries this rule includes.
    pub referenced_rules: Vec<Reference>,
    /// Signature and other metadata.
    pub attributes: Attributes,
}

persistent_object!(Rule {
    with_attributes!();
});

impl Rule {
    /// Creates a rule.
    #[must_use]
    pub fn new(name: impl Into<String>, rule_type: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::named(name),
            rule_type: Some(rule_type.into()),
            ..Self::default()
        }
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the language, falling back to the default.
    #[must_use]
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Whether the rule has no source to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.as_deref().map_or(true, |s| s.trim().is_empty())
    }
}
