//! Bundle (role) domain model.
//!
//! Roles form a graph: a role inherits from others, permits optional
//! roles and requires mandatory ones. All three edges are references so
//! that deleting a role only needs to prune lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::object::{persistent_object, with_attributes, ObjectHeader};
use crate::reference::{remove_reference, Reference};

/// A role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bundle {
    /// Common object fields.
    pub header: ObjectHeader,

    /// Role type name (e.g. "business", "it").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    // === Role graph ===
    /// Roles this role inherits from.
    pub inheritance: Vec<Reference>,
    /// Roles holders may additionally request.
    pub permits: Vec<Reference>,
    /// Roles holders must also have.
    pub requirements: Vec<Reference>,

    // === Activation ===
    /// Role becomes active at this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_date: Option<DateTime<Utc>>,
    /// Role becomes inactive at this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivation_date: Option<DateTime<Utc>>,

    /// Risk weight contributed to identity scores.
    pub risk_score_weight: i32,

    /// Extended attributes.
    pub attributes: Attributes,
}

persistent_object!(Bundle {
    with_attributes!();
});

impl Bundle {
    /// Creates a role with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::named(name),
            ..Self::default()
        }
    }

    /// Sets the role type.
    #[must_use]
    pub fn with_type(mut self, role_type: impl Into<String>) -> Self {
        self.role_type = Some(role_type.into());
        self
    }

    /// Adds an inherited role if not already present.
    pub fn add_inheritance(&mut self, role: Reference) {
        if !self.inheritance.iter().any(|r| r.same_target(&role)) {
            self.inheritance.push(role);
        }
    }

    /// Removes an inherited role. Returns whether it was present.
    pub fn remove_inheritance(&mut self, role: &Reference) -> bool {
        remove_reference(&mut self.inheritance, role)
    }

    /// Adds a permitted role if not already present.
    pub fn add_permit(&mut self, role: Reference) {
        if !self.permits.iter().any(|r| r.same_target(&role)) {
            self.permits.push(role);
        }
    }

    /// Removes a permitted role. Returns whether it was present.
    pub fn remove_permit(&mut self, role: &Reference) -> bool {
        remove_reference(&mut self.permits, role)
    }

    /// Adds a required role if not already present.
    pub fn add_requirement(&mut self, role: Reference) {
        if !self.requirements.iter().any(|r| r.same_target(&role)) {
            self.requirements.push(role);
        }
    }

    /// Removes a required role. Returns whether it was present.
    pub fn remove_requirement(&mut self, role: &Reference) -> bool {
        remove_reference(&mut self.requirements, role)
    }

    /// Checks whether any edge of this role points at `role`.
    #[must_use]
    pub fn references_role(&self, role: &Reference) -> bool {
        self.inheritance
            .iter()
            .chain(&self.permits)
            .chain(&self.requirements)
            .any(|r| r.same_target(role))
    }

    /// Removes `role` from all three edge lists. Returns whether anything
    /// changed.
    pub fn prune_role(&mut self, role: &Reference) -> bool {
        let inherited = self.remove_inheritance(role);
        let permitted = self.remove_permit(role);
        let required = self.remove_requirement(role);
        inherited || permitted || required
    }

    /// Checks whether the role is active at `now`: not disabled and
    /// inside its activation window.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.header.disabled
            && self.activation_date.map_or(true, |start| start <= now)
            && self.deactivation_date.map_or(true, |end| now < end)
    }
}
