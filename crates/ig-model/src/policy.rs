//! Policy and policy violation domain models.
//!
//! A policy holds constraints; separation-of-duty constraints name two
//! sets of roles that one identity must not hold together. Violations
//! record what was found, with the conflicting role names kept as CSV so
//! the record survives the roles being deleted.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::csv::{csv_to_list, list_to_csv};
use crate::macros::str_enum;
use crate::object::{persistent_object, ObjectHeader};
use crate::reference::{remove_reference, Reference};

/// Policy type for separation-of-duty role policies.
pub const TYPE_SOD: &str = "SOD";

/// Whether a policy is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyState {
    /// Policy is evaluated.
    #[default]
    Active,
    /// Policy is ignored.
    Inactive,
}

str_enum!(PolicyState {
    Active => "Active",
    Inactive => "Inactive",
});

/// A separation-of-duty constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SodConstraint {
    /// Constraint id, unique within the policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Constraint name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description shown on violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Constraint is ignored.
    pub disabled: bool,
    /// Roles on the left side.
    pub left_bundles: Vec<Reference>,
    /// Roles on the right side.
    pub right_bundles: Vec<Reference>,
}

impl SodConstraint {
    /// Creates a named constraint.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Whether a role held on both sides would violate this constraint.
    #[must_use]
    pub fn conflicts(&self, held: &[Reference]) -> bool {
        let holds = |side: &[Reference]| side.iter().any(|r| held.iter().any(|h| h.same_target(r)));
        !self.disabled && holds(&self.left_bundles) && holds(&self.right_bundles)
    }

    /// Removes a role from both sides. Returns whether anything changed.
    pub fn prune_role(&mut self, role: &Reference) -> bool {
        let left = remove_reference(&mut self.left_bundles, role);
        let right = remove_reference(&mut self.right_bundles, role);
        left || right
    }
}

/// A compliance policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Common object fields.
    pub header: ObjectHeader,
    /// Policy type (e.g. "SOD", "Activity").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
    /// Name of the executor that evaluates the policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    /// Whether the policy is evaluated.
    pub state: PolicyState,
    /// Policy is a template for new policies.
    pub template: bool,
    /// Who owns violations of this policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation_owner: Option<Reference>,
    /// Separation-of-duty constraints.
    pub sod_constraints: Vec<SodConstraint>,
    /// Executor arguments.
    pub arguments: Attributes,
}

persistent_object!(Policy {
    fn attributes(&self) -> Option<&Attributes> {
        Some(&self.arguments)
    }

    fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        Some(&mut self.arguments)
    }
});

impl Policy {
    /// Creates a policy.
    #[must_use]
    pub fn new(name: impl Into<String>, policy_type: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::named(name),
            policy_type: Some(policy_type.into()),
            ..Self::default()
        }
    }

    /// Adds a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: SodConstraint) -> Self {
        self.sod_constraints.push(constraint);
        self
    }

    /// Looks up a constraint by name, falling back to id.
    #[must_use]
    pub fn get_constraint(&self, name_or_id: &str) -> Option<&SodConstraint> {
        self.sod_constraints
            .iter()
            .find(|c| c.name.as_deref() == Some(name_or_id))
            .or_else(|| {
                self.sod_constraints
                    .iter()
                    .find(|c| c.id.as_deref() == Some(name_or_id))
            })
    }

    /// Whether the policy is evaluated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == PolicyState::Active && !self.header.disabled
    }

    /// Removes a role from every constraint. Returns whether anything
    /// changed.
    pub fn prune_role(&mut self, role: &Reference) -> bool {
        self.sod_constraints
            .iter_mut()
            .fold(false, |changed, c| c.prune_role(role) || changed)
    }
}

/// Status of a violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ViolationStatus {
    #[default]
    Open,
    Mitigated,
    Remediated,
    Delegated,
}

str_enum!(ViolationStatus {
    Open => "Open",
    Mitigated => "Mitigated",
    Remediated => "Remediated",
    Delegated => "Delegated",
});

/// A detected policy violation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyViolation {
    /// Common object fields.
    pub header: ObjectHeader,
    /// Identity in violation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Reference>,
    /// Violation has not been resolved.
    pub active: bool,
    /// Current status.
    pub status: ViolationStatus,

    // === Policy ===
    /// Id of the violated policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Name of the violated policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    /// Id of the violated constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_id: Option<String>,
    /// Name of the violated constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,

    // === Conflicting roles ===
    /// Left-side role names as CSV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_bundles: Option<String>,
    /// Right-side role names as CSV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_bundles: Option<String>,
    /// Role names picked for remediation as CSV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundles_marked_for_remediation: Option<String>,

    /// Name of whoever mitigated the violation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigator: Option<String>,
    /// Violation should raise an alert.
    pub alertable: bool,
    /// Details captured when the violation was detected.
    pub arguments: Attributes,
}

persistent_object!(PolicyViolation {
    fn is_name_unique(&self) -> bool {
        false
    }

    fn attributes(&self) -> Option<&Attributes> {
        Some(&self.arguments)
    }

    fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        Some(&mut self.arguments)
    }
});

fn add_csv_name(csv: &mut Option<String>, name: &str) {
    let mut names = csv.as_deref().map(csv_to_list).unwrap_or_default();
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
    *csv = list_to_csv(&names);
}

impl PolicyViolation {
    /// Creates an open violation of a policy constraint by an identity.
    #[must_use]
    pub fn new(policy: &Policy, constraint: &SodConstraint, identity: Reference) -> Self {
        Self {
            identity: Some(identity),
            active: true,
            policy_id: policy.header.id.clone(),
            policy_name: policy.header.name.clone(),
            constraint_id: constraint.id.clone(),
            constraint_name: constraint.name.clone(),
            ..Self::default()
        }
    }

    /// Left-side role names.
    #[must_use]
    pub fn left_bundle_names(&self) -> Vec<String> {
        self.left_bundles.as_deref().map(csv_to_list).unwrap_or_default()
    }

    /// Replaces the left-side role names.
    pub fn set_left_bundle_names<S: AsRef<str>>(&mut self, names: &[S]) {
        self.left_bundles = list_to_csv(names);
    }

    /// Adds a left-side role name, ignoring duplicates.
    pub fn add_left_bundle(&mut self, name: &str) {
        add_csv_name(&mut self.left_bundles, name);
    }

    /// Right-side role names.
    #[must_use]
    pub fn right_bundle_names(&self) -> Vec<String> {
        self.right_bundles.as_deref().map(csv_to_list).unwrap_or_default()
    }

    /// Replaces the right-side role names.
    pub fn set_right_bundle_names<S: AsRef<str>>(&mut self, names: &[S]) {
        self.right_bundles = list_to_csv(names);
    }

    /// Adds a right-side role name, ignoring duplicates.
    pub fn add_right_bundle(&mut self, name: &str) {
        add_csv_name(&mut self.right_bundles, name);
    }

    /// Role names picked for remediation.
    #[must_use]
    pub fn bundle_names_marked_for_remediation(&self) -> Vec<String> {
        self.bundles_marked_for_remediation
            .as_deref()
            .map(csv_to_list)
            .unwrap_or_default()
    }

    /// Replaces the role names picked for remediation.
    pub fn set_bundle_names_marked_for_remediation<S: AsRef<str>>(&mut self, names: &[S]) {
        self.bundles_marked_for_remediation = list_to_csv(names);
    }

    /// Whether the violation is still open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Records a mitigation.
    pub fn mitigate(&mut self, mitigator: impl Into<String>) {
        self.mitigator = Some(mitigator.into());
        self.status = ViolationStatus::Mitigated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ObjectClass;
    use crate::object::PersistentObject;

    fn role(name: &str) -> Reference {
        Reference::by_name(ObjectClass::Bundle, name)
    }

    fn sod() -> SodConstraint {
        let mut c = SodConstraint::new("AP vs AR");
        c.id = Some("c1".into());
        c.left_bundles.push(role("Accounts Payable"));
        c.right_bundles.push(role("Accounts Receivable"));
        c
    }

    #[test]
    fn constraint_lookup_by_name_or_id() {
        let policy = Policy::new("SOD Policy", TYPE_SOD).with_constraint(sod());
        assert!(policy.get_constraint("AP vs AR").is_some());
        assert!(policy.get_constraint("c1").is_some());
        assert!(policy.get_constraint("missing").is_none());
        assert!(policy.is_active());
    }

    #[test]
    fn constraint_conflicts() {
        let c = sod();
        assert!(c.conflicts(&[role("Accounts Payable"), role("Accounts Receivable")]));
        assert!(!c.conflicts(&[role("Accounts Payable")]));

        let mut disabled = sod();
        disabled.disabled = true;
        assert!(!disabled.conflicts(&[role("Accounts Payable"), role("Accounts Receivable")]));
    }

    #[test]
    fn prune_role_from_policy() {
        let mut policy = Policy::new("SOD Policy", TYPE_SOD).with_constraint(sod());
        assert!(policy.prune_role(&role("Accounts Payable")));
        assert!(policy.sod_constraints[0].left_bundles.is_empty());
        assert!(!policy.prune_role(&role("Accounts Payable")));
    }

    #[test]
    fn violation_bundle_csv() {
        let policy = Policy::new("SOD Policy", TYPE_SOD);
        let mut v = PolicyViolation::new(&policy, &sod(), Reference::by_name(ObjectClass::Identity, "jsmith"));
        assert!(v.is_active());
        assert!(!v.is_name_unique());
        assert_eq!(v.constraint_name.as_deref(), Some("AP vs AR"));

        v.add_left_bundle("Accounts Payable");
        v.add_left_bundle("Accounts Payable");
        v.add_left_bundle("Finance, Global");
        assert_eq!(v.left_bundle_names(), vec!["Accounts Payable", "Finance, Global"]);

        v.set_right_bundle_names(&["Accounts Receivable"]);
        assert_eq!(v.right_bundles.as_deref(), Some("Accounts Receivable"));

        v.set_right_bundle_names::<&str>(&[]);
        assert!(v.right_bundles.is_none());
        assert!(v.right_bundle_names().is_empty());
    }

    #[test]
    fn mitigation() {
        let mut v = PolicyViolation::default();
        v.mitigate("spadmin");
        assert_eq!(v.status, ViolationStatus::Mitigated);
        assert_eq!(v.mitigator.as_deref(), Some("spadmin"));
        assert_eq!(ViolationStatus::parse("remediated"), Some(ViolationStatus::Remediated));
    }
}
