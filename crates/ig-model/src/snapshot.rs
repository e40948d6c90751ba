//! Snapshots.
//!
//! Snapshots capture an object's state at a point in time for later
//! comparison. They hold names and plain values only, so they stay
//! readable after the objects they describe change or disappear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::bundle::Bundle;
use crate::identity::Identity;
use crate::link::Link;
use crate::reference::reference_names;

/// A detached copy of a role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSnapshot {
    /// Role name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Names of inherited roles.
    pub inheritance: Vec<String>,
    /// Names of permitted roles.
    pub permits: Vec<String>,
    /// Names of required roles.
    pub requirements: Vec<String>,
    /// Extended attributes.
    pub attributes: Attributes,
    /// When the snapshot was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl BundleSnapshot {
    /// Captures a role now.
    #[must_use]
    pub fn from_bundle(bundle: &Bundle) -> Self {
        Self {
            name: bundle.header.name.clone(),
            role_type: bundle.role_type.clone(),
            display_name: bundle.display_name.clone(),
            inheritance: reference_names(&bundle.inheritance),
            permits: reference_names(&bundle.permits),
            requirements: reference_names(&bundle.requirements),
            attributes: bundle.attributes.clone(),
            captured_at: Some(Utc::now()),
        }
    }

    /// Whether the captured role state differs, ignoring capture time and
    /// the order of the name lists.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        fn sorted(list: &[String]) -> Vec<&str> {
            let mut v: Vec<&str> = list.iter().map(String::as_str).collect();
            v.sort_unstable();
            v
        }

        self.name != other.name
            || self.role_type != other.role_type
            || self.display_name != other.display_name
            || sorted(&self.inheritance) != sorted(&other.inheritance)
            || sorted(&self.permits) != sorted(&other.permits)
            || sorted(&self.requirements) != sorted(&other.requirements)
            || self.attributes != other.attributes
    }
}

/// How a role came to be assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleAssignmentSnapshot {
    /// Role name.
    pub role_name: String,
    /// Id of the assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    /// Who assigned the role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigner: Option<String>,
    /// When it was assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Source of the assignment (e.g. "LCM", "Rule").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The assignment forbids the role rather than grants it.
    pub negative: bool,
}

impl RoleAssignmentSnapshot {
    /// Creates a snapshot of a positive assignment.
    #[must_use]
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            ..Self::default()
        }
    }
}

/// One account held by a captured identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    /// Application name.
    pub application: String,
    /// Account identifier.
    pub native_identity: String,
}

/// A summary of an identity's access at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySnapshot {
    /// Identity name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_name: Option<String>,
    /// Assigned role names.
    pub assigned_roles: Vec<String>,
    /// Detected role names.
    pub detected_roles: Vec<String>,
    /// Accounts held.
    pub links: Vec<LinkSummary>,
    /// Identity attributes.
    pub attributes: Attributes,
    /// When the snapshot was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl IdentitySnapshot {
    /// Captures an identity and the accounts it holds. Links without an
    /// application or native identity are skipped.
    #[must_use]
    pub fn capture(identity: &Identity, links: &[Link]) -> Self {
        let links = links
            .iter()
            .filter_map(|link| {
                Some(LinkSummary {
                    application: link.application.as_ref()?.display_name().to_string(),
                    native_identity: link.native_identity.clone()?,
                })
            })
            .collect();

        Self {
            identity_name: identity.header.name.clone(),
            assigned_roles: reference_names(&identity.assigned_roles),
            detected_roles: reference_names(&identity.detected_roles),
            links,
            attributes: identity.attributes.clone(),
            captured_at: Some(Utc::now()),
        }
    }

    /// Whether the identity held the named role (assigned or detected).
    #[must_use]
    pub fn had_role(&self, name: &str) -> bool {
        self.assigned_roles
            .iter()
            .chain(&self.detected_roles)
            .any(|r| r == name)
    }
}
