//! Application domain model.
//!
//! An application is a system whose accounts are aggregated into
//! [`Link`](crate::link::Link)s. The connector-level details live in the
//! attribute bag; the record itself only holds what governance needs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::config_objects::CorrelationConfig;
use crate::csv::{csv_to_list, list_to_csv};
use crate::error::{ModelError, ModelResult};
use crate::object::{persistent_object, with_attributes, ObjectHeader};
use crate::reference::{remove_reference, Reference};

/// Capabilities a connector advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum Feature {
    Authenticate,
    Composite,
    DirectPermissions,
    DiscoverSchema,
    Enable,
    ManagerLookup,
    NoRandomAccess,
    Proxy,
    Search,
    Template,
    Unlock,
    UnstructuredTargets,
    SharepointTarget,
    Provisioning,
    GroupProvisioning,
    SyncProvisioning,
    Password,
    CurrentPassword,
    AccountOnlyRequest,
    AdditionalAccountRequest,
    NoAggregation,
    GroupsHaveMembers,
    NoPermissionsProvisioning,
    NoGroupPermissionsProvisioning,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Self; 24] = [
        Self::Authenticate,
        Self::Composite,
        Self::DirectPermissions,
        Self::DiscoverSchema,
        Self::Enable,
        Self::ManagerLookup,
        Self::NoRandomAccess,
        Self::Proxy,
        Self::Search,
        Self::Template,
        Self::Unlock,
        Self::UnstructuredTargets,
        Self::SharepointTarget,
        Self::Provisioning,
        Self::GroupProvisioning,
        Self::SyncProvisioning,
        Self::Password,
        Self::CurrentPassword,
        Self::AccountOnlyRequest,
        Self::AdditionalAccountRequest,
        Self::NoAggregation,
        Self::GroupsHaveMembers,
        Self::NoPermissionsProvisioning,
        Self::NoGroupPermissionsProvisioning,
    ];

    /// Returns the feature name as written in CSV lists.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "AUTHENTICATE",
            Self::Composite => "COMPOSITE",
            Self::DirectPermissions => "DIRECT_PERMISSIONS",
            Self::DiscoverSchema => "DISCOVER_SCHEMA",
            Self::Enable => "ENABLE",
            Self::ManagerLookup => "MANAGER_LOOKUP",
            Self::NoRandomAccess => "NO_RANDOM_ACCESS",
            Self::Proxy => "PROXY",
            Self::Search => "SEARCH",
            Self::Template => "TEMPLATE",
            Self::Unlock => "UNLOCK",
            Self::UnstructuredTargets => "UNSTRUCTURED_TARGETS",
            Self::SharepointTarget => "SHAREPOINT_TARGET",
            Self::Provisioning => "PROVISIONING",
            Self::GroupProvisioning => "GROUP_PROVISIONING",
            Self::SyncProvisioning => "SYNC_PROVISIONING",
            Self::Password => "PASSWORD",
            Self::CurrentPassword => "CURRENT_PASSWORD",
            Self::AccountOnlyRequest => "ACCOUNT_ONLY_REQUEST",
            Self::AdditionalAccountRequest => "ADDITIONAL_ACCOUNT_REQUEST",
            Self::NoAggregation => "NO_AGGREGATION",
            Self::GroupsHaveMembers => "GROUPS_HAVE_MEMBERS",
            Self::NoPermissionsProvisioning => "NO_PERMISSIONS_PROVISIONING",
            Self::NoGroupPermissionsProvisioning => "NO_GROUP_PERMISSIONS_PROVISIONING",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ModelError::invalid_value("features", format!("unknown feature {s}")))
    }
}

/// Chooses which account a role provisions onto when an identity has
/// several on the same application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationAccountSelectorRule {
    /// Application the rule applies to.
    pub application: Reference,
    /// Rule that selects the account.
    pub rule: Reference,
}

impl ApplicationAccountSelectorRule {
    /// Creates a selector binding.
    #[must_use]
    pub fn new(application: Reference, rule: Reference) -> Self {
        Self { application, rule }
    }

    /// Selector bindings are anonymous join records.
    #[must_use]
    pub const fn has_name(&self) -> bool {
        false
    }
}

/// A managed system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    /// Common object fields.
    pub header: ObjectHeader,

    // === Connector ===
    /// Connector implementation name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    /// Application type (e.g. "Active Directory - Direct").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    /// Advertised connector features.
    pub features: Vec<Feature>,
    /// Application whose connector proxies for this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Reference>,
    /// Aggregate accounts as authoritative identity sources.
    pub authoritative: bool,

    // === Correlation ===
    /// How accounts are matched to identities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_correlation_config: Option<CorrelationConfig>,

    // === Governance ===
    /// Identities who fix violations on this application.
    pub remediators: Vec<Reference>,
    /// Applications that must be provisioned first.
    pub dependencies: Vec<Reference>,
    /// Account selector rules.
    pub account_selector_rules: Vec<ApplicationAccountSelectorRule>,

    /// Connector configuration.
    pub attributes: Attributes,
}

persistent_object!(Application {
    with_attributes!();
});

impl Application {
    /// Creates an application with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::named(name),
            ..Self::default()
        }
    }

    /// Sets the connector.
    #[must_use]
    pub fn with_connector(mut self, connector: impl Into<String>) -> Self {
        self.connector = Some(connector.into());
        self
    }

    /// Sets the application type.
    #[must_use]
    pub fn with_type(mut self, app_type: impl Into<String>) -> Self {
        self.app_type = Some(app_type.into());
        self
    }

    /// Adds a feature.
    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.add_feature(feature);
        self
    }

    /// Checks whether the connector advertises a feature.
    #[must_use]
    pub fn supports_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Adds a feature if not already present.
    pub fn add_feature(&mut self, feature: Feature) {
        if !self.supports_feature(feature) {
            self.features.push(feature);
        }
    }

    /// Removes a feature.
    pub fn remove_feature(&mut self, feature: Feature) {
        self.features.retain(|f| *f != feature);
    }

    /// Returns the features as a CSV string, or `None` when there are none.
    #[must_use]
    pub fn features_string(&self) -> Option<String> {
        let names: Vec<&str> = self.features.iter().map(|f| f.as_str()).collect();
        list_to_csv(&names)
    }

    /// Replaces the features from a CSV string. An empty string leaves
    /// the current features alone.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::InvalidValue` if a name is not a known feature.
    pub fn set_features_string(&mut self, csv: &str) -> ModelResult<()> {
        let names = csv_to_list(csv);
        if names.is_empty() {
            return Ok(());
        }
        self.features = names
            .iter()
            .map(|name| name.parse())
            .collect::<ModelResult<Vec<Feature>>>()?;
        Ok(())
    }

    /// Adds a dependency on another application.
    pub fn add_dependency(&mut self, app: Reference) {
        if !self.dependencies.iter().any(|d| d.same_target(&app)) {
            self.dependencies.push(app);
        }
    }

    /// Removes a dependency. Returns whether it was present.
    pub fn remove_dependency(&mut self, app: &Reference) -> bool {
        remove_reference(&mut self.dependencies, app)
    }

    /// Removes a remediator. Returns whether it was present.
    pub fn remove_remediator(&mut self, identity: &Reference) -> bool {
        remove_reference(&mut self.remediators, identity)
    }

    /// Whether this application's connector runs through another one.
    #[must_use]
    pub const fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }
}
