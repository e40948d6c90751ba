//! Identity domain model.
//!
//! Identities are people (or workgroups of people). They own accounts on
//! applications through [`Link`](crate::link::Link)s and hold roles either
//! because someone assigned them or because the correlation engine
//! detected the underlying entitlements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::class::ObjectClass;
use crate::object::{persistent_object, with_attributes, ObjectHeader};
use crate::reference::{remove_reference, Reference};

/// Per-role bookkeeping kept on an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMetadata {
    /// The role described.
    pub role: Reference,
    /// Role was assigned.
    #[serde(default)]
    pub assigned: bool,
    /// Role was detected.
    #[serde(default)]
    pub detected: bool,
    /// Identity holds entitlements beyond what the role requires.
    #[serde(default)]
    pub additional_entitlements: bool,
    /// Identity lacks entitlements the role requires.
    #[serde(default)]
    pub missing_required: bool,
}

impl RoleMetadata {
    /// Creates metadata for a role with no flags set.
    #[must_use]
    pub fn new(role: Reference) -> Self {
        Self {
            role,
            assigned: false,
            detected: false,
            additional_entitlements: false,
            missing_required: false,
        }
    }

    /// Role metadata is keyed by role, not by name.
    #[must_use]
    pub const fn is_name_unique(&self) -> bool {
        false
    }
}

/// A person or workgroup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    /// Common object fields.
    pub header: ObjectHeader,

    // === Profile ===
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<Reference>,

    // === Status ===
    /// Identity is a workgroup rather than a person.
    pub workgroup: bool,
    /// Identity has left or been deactivated.
    pub inactive: bool,
    /// Identity was created from an authoritative account.
    pub correlated: bool,

    // === Access ===
    /// Roles explicitly assigned.
    pub assigned_roles: Vec<Reference>,
    /// Roles detected from entitlements.
    pub detected_roles: Vec<Reference>,
    /// Bookkeeping for each held role.
    pub role_metadatas: Vec<RoleMetadata>,
    /// Accounts held on applications.
    pub links: Vec<Reference>,
    /// Capability names.
    pub capabilities: Vec<String>,
    /// Scopes this identity administers.
    pub controlled_scopes: Vec<Reference>,

    // === Timestamps ===
    /// Last interactive login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    /// Last refresh by the identity refresh task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,

    /// Extended attributes.
    pub attributes: Attributes,
}

persistent_object!(Identity {
    with_attributes!();
});

impl Identity {
    /// Creates an identity with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::named(name),
            ..Self::default()
        }
    }

    /// Creates a workgroup.
    #[must_use]
    pub fn workgroup(name: impl Into<String>) -> Self {
        Self {
            workgroup: true,
            ..Self::new(name)
        }
    }

    /// Sets the first name.
    #[must_use]
    pub fn with_firstname(mut self, name: impl Into<String>) -> Self {
        self.firstname = Some(name.into());
        self
    }

    /// Sets the last name.
    #[must_use]
    pub fn with_lastname(mut self, name: impl Into<String>) -> Self {
        self.lastname = Some(name.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the manager.
    #[must_use]
    pub fn with_manager(mut self, manager: Reference) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Returns "first last", whichever parts are present.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match (&self.firstname, &self.lastname) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }

    /// Returns the display name, falling back to the full name and then
    /// the object name.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.full_name())
            .or_else(|| self.header.name.clone())
            .unwrap_or_default()
    }

    /// Checks if this is a workgroup.
    #[must_use]
    pub const fn is_workgroup(&self) -> bool {
        self.workgroup
    }

    /// Assigns a role. Does nothing if the role is already assigned.
    pub fn add_assigned_role(&mut self, role: Reference) {
        if !self.assigned_roles.iter().any(|r| r.same_target(&role)) {
            self.assigned_roles.push(role.clone());
        }
        self.metadata_for(role).assigned = true;
    }

    /// Records a detected role. Does nothing if the role is already detected.
    pub fn add_detected_role(&mut self, role: Reference) {
        if !self.detected_roles.iter().any(|r| r.same_target(&role)) {
            self.detected_roles.push(role.clone());
        }
        self.metadata_for(role).detected = true;
    }

    fn metadata_for(&mut self, role: Reference) -> &mut RoleMetadata {
        let index = match self.role_metadatas.iter().position(|m| m.role.same_target(&role)) {
            Some(index) => index,
            None => {
                self.role_metadatas.push(RoleMetadata::new(role));
                self.role_metadatas.len() - 1
            }
        };
        &mut self.role_metadatas[index]
    }

    /// Removes a role from the assigned and detected lists and drops its
    /// metadata. Returns whether anything changed.
    pub fn remove_role(&mut self, role: &Reference) -> bool {
        let assigned = remove_reference(&mut self.assigned_roles, role);
        let detected = remove_reference(&mut self.detected_roles, role);
        let before = self.role_metadatas.len();
        self.role_metadatas.retain(|m| !m.role.same_target(role));
        assigned || detected || self.role_metadatas.len() != before
    }

    /// Checks whether the identity holds a role (assigned or detected) by
    /// name.
    #[must_use]
    pub fn has_role(&self, name: &str) -> bool {
        self.assigned_roles
            .iter()
            .chain(&self.detected_roles)
            .any(|r| r.name() == Some(name))
    }

    /// Returns the metadata for a role.
    #[must_use]
    pub fn role_metadata(&self, role: &Reference) -> Option<&RoleMetadata> {
        self.role_metadatas.iter().find(|m| m.role.same_target(role))
    }

    /// Adds an account.
    pub fn add_link(&mut self, link: Reference) {
        if !self.links.iter().any(|l| l.same_target(&link)) {
            self.links.push(link);
        }
    }

    /// Removes an account. Returns whether it was present.
    pub fn remove_link(&mut self, link: &Reference) -> bool {
        remove_reference(&mut self.links, link)
    }

    /// Checks whether the identity has a capability.
    #[must_use]
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c == name)
    }

    /// Checks whether `manager` is this identity's manager.
    #[must_use]
    pub fn is_managed_by(&self, manager: &Reference) -> bool {
        manager.class == ObjectClass::Identity
            && self.manager.as_ref().is_some_and(|m| m.same_target(manager))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> Reference {
        Reference::by_name(ObjectClass::Bundle, name)
    }

    #[test]
    fn full_name_variants() {
        let id = Identity::new("jsmith").with_firstname("John").with_lastname("Smith");
        assert_eq!(id.full_name().as_deref(), Some("John Smith"));
        assert_eq!(id.display_label(), "John Smith");

        let only_last = Identity::new("x").with_lastname("Smith");
        assert_eq!(only_last.full_name().as_deref(), Some("Smith"));

        let bare = Identity::new("bare");
        assert_eq!(bare.full_name(), None);
        assert_eq!(bare.display_label(), "bare");
    }

    #[test]
    fn assign_and_detect_share_metadata() {
        let mut id = Identity::new("jsmith");
        id.add_assigned_role(role("Accounting"));
        id.add_assigned_role(role("Accounting"));
        id.add_detected_role(role("Accounting"));

        assert_eq!(id.assigned_roles.len(), 1);
        assert_eq!(id.detected_roles.len(), 1);
        assert_eq!(id.role_metadatas.len(), 1);

        let meta = id.role_metadata(&role("Accounting")).unwrap();
        assert!(meta.assigned);
        assert!(meta.detected);
        assert!(!meta.is_name_unique());
        assert!(id.has_role("Accounting"));
    }

    #[test]
    fn remove_role_clears_everything() {
        let mut id = Identity::new("jsmith");
        id.add_assigned_role(role("A"));
        id.add_detected_role(role("B"));

        assert!(id.remove_role(&role("A")));
        assert!(!id.has_role("A"));
        assert!(id.has_role("B"));
        assert!(id.role_metadata(&role("A")).is_none());
        assert!(!id.remove_role(&role("A")));
    }

    #[test]
    fn links_are_deduplicated() {
        let mut id = Identity::new("jsmith");
        let link = Reference::by_id(ObjectClass::Link, "l1");
        id.add_link(link.clone());
        id.add_link(link.clone());
        assert_eq!(id.links.len(), 1);
        assert!(id.remove_link(&link));
        assert!(id.links.is_empty());
    }

    #[test]
    fn workgroup_flag() {
        assert!(Identity::workgroup("Help Desk").is_workgroup());
        assert!(!Identity::new("jsmith").is_workgroup());
    }

    #[test]
    fn manager_check() {
        let boss = Reference::by_name(ObjectClass::Identity, "boss");
        let id = Identity::new("jsmith").with_manager(boss.clone());
        assert!(id.is_managed_by(&boss));
        assert!(!id.is_managed_by(&Reference::by_name(ObjectClass::Identity, "other")));
    }
}
