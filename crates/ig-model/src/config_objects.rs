//! Configuration value objects.
//!
//! Small records that live inside other objects (applications, system
//! configuration) and have no identity of their own.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;

/// Multi-factor authentication settings for one population.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfaConfig {
    /// MFA is enforced for the population.
    pub enabled: bool,
    /// Workflow that performs the second factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    /// Population whose members must use MFA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population_name: Option<String>,
    /// Application used to verify the second factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
}

impl MfaConfig {
    /// Creates an enabled configuration bound to a workflow.
    #[must_use]
    pub fn new(workflow_name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            workflow_name: Some(workflow_name.into()),
            ..Self::default()
        }
    }

    /// Sets the population.
    #[must_use]
    pub fn with_population(mut self, population: impl Into<String>) -> Self {
        self.population_name = Some(population.into());
        self
    }

    /// Whether the configuration is usable: enabled and bound to a
    /// workflow.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.enabled && self.workflow_name.as_deref().is_some_and(|w| !w.is_empty())
    }
}

/// Copies one account attribute into one identity attribute during
/// correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAssignment {
    /// Identity attribute receiving the value.
    pub identity_attribute: String,
    /// Account attribute supplying the value.
    pub account_attribute: String,
}

/// A condition an account must satisfy before correlation applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationCondition {
    /// Account attribute tested.
    pub attribute: String,
    /// Required value.
    pub value: String,
}

/// Rules for matching application accounts to identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Name of the configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Attribute pairs compared between identity and account.
    pub attribute_assignments: Vec<AttributeAssignment>,
    /// Conditions that must all hold on the account.
    pub conditions: Vec<CorrelationCondition>,
}

impl CorrelationConfig {
    /// Adds an attribute assignment.
    #[must_use]
    pub fn with_assignment(
        mut self,
        identity_attribute: impl Into<String>,
        account_attribute: impl Into<String>,
    ) -> Self {
        self.attribute_assignments.push(AttributeAssignment {
            identity_attribute: identity_attribute.into(),
            account_attribute: account_attribute.into(),
        });
        self
    }

    /// Adds a condition.
    #[must_use]
    pub fn with_condition(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push(CorrelationCondition {
            attribute: attribute.into(),
            value: value.into(),
        });
        self
    }

    /// Returns the assignment reading the given account attribute.
    #[must_use]
    pub fn matches_attribute(&self, account_attribute: &str) -> Option<&AttributeAssignment> {
        self.attribute_assignments
            .iter()
            .find(|a| a.account_attribute == account_attribute)
    }

    /// Whether every condition holds on the account.
    #[must_use]
    pub fn applies_to(&self, account: &Attributes) -> bool {
        self.conditions
            .iter()
            .all(|c| account.get_string(&c.attribute).as_deref() == Some(c.value.as_str()))
    }

    /// Whether the account correlates to the identity: conditions hold and
    /// at least one assignment finds equal, non-empty values on both sides.
    #[must_use]
    pub fn correlates(&self, identity: &Attributes, account: &Attributes) -> bool {
        self.applies_to(account)
            && self.attribute_assignments.iter().any(|a| {
                match (
                    identity.get_string(&a.identity_attribute),
                    account.get_string(&a.account_attribute),
                ) {
                    (Some(i), Some(acct)) => !i.is_empty() && i.eq_ignore_ascii_case(&acct),
                    _ => false,
                }
            })
    }
}

/// A file share scanned for unstructured permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsShare {
    /// UNC path of the share.
    pub path: String,
    /// How many directory levels to scan (-1 for unlimited).
    pub depth: i32,
    /// Report permissions inherited from parent folders.
    pub inherit: bool,
    /// Report explicit rights set on the folder itself.
    pub include_explicit_rights: bool,
}

impl WindowsShare {
    /// Creates a share scanned without depth limit, reporting explicit
    /// rights only.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            depth: -1,
            inherit: false,
            include_explicit_rights: true,
        }
    }

    /// Whether scanning descends without limit.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.depth < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mfa_usable_needs_workflow() {
        assert!(MfaConfig::new("MFA Duo").with_population("Admins").is_usable());
        assert!(!MfaConfig::default().is_usable());

        let mut disabled = MfaConfig::new("MFA Duo");
        disabled.enabled = false;
        assert!(!disabled.is_usable());
    }

    #[test]
    fn correlation_by_assignment() {
        let config = CorrelationConfig::default()
            .with_assignment("empId", "employeeNumber")
            .with_condition("type", "employee");

        let identity = Attributes::new().with("empId", "1001");
        let account = Attributes::new()
            .with("employeeNumber", "1001")
            .with("type", "employee");
        assert!(config.correlates(&identity, &account));

        let contractor = Attributes::new()
            .with("employeeNumber", "1001")
            .with("type", "contractor");
        assert!(!config.correlates(&identity, &contractor));

        assert_eq!(
            config.matches_attribute("employeeNumber").map(|a| a.identity_attribute.as_str()),
            Some("empId")
        );
        assert!(config.matches_attribute("mail").is_none());
    }

    #[test]
    fn empty_values_never_correlate() {
        let config = CorrelationConfig::default().with_assignment("empId", "employeeNumber");
        let identity = Attributes::new().with("empId", "");
        let account = Attributes::new().with("employeeNumber", "");
        assert!(!config.correlates(&identity, &account));
    }

    #[test]
    fn share_defaults() {
        let share = WindowsShare::new("\\\\fs01\\finance");
        assert!(share.is_unlimited());
        assert!(share.include_explicit_rights);
        assert!(!share.inherit);
    }
}
