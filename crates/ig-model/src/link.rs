//! Link (account) domain model.
//!
//! A link is one account on one application, correlated to an identity.
//! Links are not named; they are identified by the application, the
//! optional instance and the account's native identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::object::{persistent_object, with_attributes, ObjectHeader};
use crate::reference::Reference;

/// Properties forming a link's unique key.
pub const LINK_UNIQUE_KEY: &[&str] = &["application", "instance", "nativeIdentity"];

/// An account on an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    /// Common object fields.
    pub header: ObjectHeader,

    // === Ownership ===
    /// Identity owning the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Reference>,
    /// Application hosting the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Reference>,
    /// Application instance for multi-instance applications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    // === Account ===
    /// Account identifier on the application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_identity: Option<String>,
    /// Friendlier account name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Immutable unique id some directories supply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    // === Flags ===
    /// Account carries entitlements.
    pub entitlements: bool,
    /// Correlated by hand rather than by rule.
    pub manually_correlated: bool,

    /// Last aggregation of this account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,

    /// Account attributes.
    pub attributes: Attributes,
}

persistent_object!(Link {
    with_attributes!();

    fn has_name(&self) -> bool {
        false
    }

    fn unique_key_properties(&self) -> &'static [&'static str] {
        LINK_UNIQUE_KEY
    }

    fn unique_key(&self) -> Option<String> {
        let application = self.application.as_ref()?.display_name().to_string();
        let native = self.native_identity.as_deref()?;
        Some(format!(
            "{application}|{}|{native}",
            self.instance.as_deref().unwrap_or_default()
        ))
    }
});

impl Link {
    /// Creates a link for a native identity.
    #[must_use]
    pub fn new(native_identity: impl Into<String>) -> Self {
        Self {
            native_identity: Some(native_identity.into()),
            ..Self::default()
        }
    }

    /// Sets the application.
    #[must_use]
    pub fn with_application(mut self, application: Reference) -> Self {
        self.application = Some(application);
        self
    }

    /// Sets the owning identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Reference) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Returns the display name, falling back to the native identity.
    #[must_use]
    pub fn display_name_or_native(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.native_identity.as_deref())
    }

    /// Checks whether the link lives on the given application.
    #[must_use]
    pub fn is_on(&self, application: &Reference) -> bool {
        self.application
            .as_ref()
            .is_some_and(|a| a.same_target(application))
    }

    /// Checks whether the link belongs to the given identity.
    #[must_use]
    pub fn is_owned_by(&self, identity: &Reference) -> bool {
        self.identity.as_ref().is_some_and(|i| i.same_target(identity))
    }
}
