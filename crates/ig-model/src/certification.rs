//! Certification domain model.
//!
//! A certification is an access review: certifiers decide, item by item,
//! whether identities should keep what they have. The record tracks who
//! certifies, where the review is in its lifecycle, and the counters that
//! progress screens read.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::error::{ModelError, ModelResult};
use crate::macros::str_enum;
use crate::object::{persistent_object, with_attributes, ObjectHeader};

/// Percentage of `completed` out of `total`, rounded down. Zero when there
/// is nothing to complete.
#[must_use]
pub const fn calculate_percent_complete(completed: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        completed.saturating_mul(100) / total
    }
}

/// What a certification reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum CertificationType {
    #[default]
    Manager,
    ApplicationOwner,
    Identity,
    BusinessRoleMembership,
    BusinessRoleComposition,
    AccountGroupPermissions,
    AccountGroupMembership,
    DataOwner,
    Focused,
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum CertificationPhase {
    Staged,
    Active,
    Challenge,
    Remediation,
    End,
}

str_enum!(CertificationType {
    Manager => "Manager",
    ApplicationOwner => "ApplicationOwner",
    Identity => "Identity",
    BusinessRoleMembership => "BusinessRoleMembership",
    BusinessRoleComposition => "BusinessRoleComposition",
    AccountGroupPermissions => "AccountGroupPermissions",
    AccountGroupMembership => "AccountGroupMembership",
    DataOwner => "DataOwner",
    Focused => "Focused",
});

str_enum!(CertificationPhase {
    Staged => "Staged",
    Active => "Active",
    Challenge => "Challenge",
    Remediation => "Remediation",
    End => "End",
});

/// Kind of item being decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum CertificationItemType {
    PolicyViolation,
    Bundle,
    BusinessRoleHierarchy,
    BusinessRolePermit,
    BusinessRoleRequirement,
    BusinessRoleGrantedCapability,
    BusinessRoleGrantedScope,
    BusinessRoleProfile,
    AccountGroupMembership,
    Account,
    DataOwner,
    Exception,
}

/// A certifier's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum DecisionStatus {
    Approved,
    Mitigated,
    Remediated,
    Acknowledged,
    Delegated,
    Cleared,
}

/// Bucket that decision counters are kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum DecisionCategory {
    Violations,
    Roles,
    RoleHierarchies,
    Permits,
    Requirements,
    Capabilities,
    Scopes,
    Profiles,
    AccountGroupMemberships,
    AccountGroupPermissions,
    Accounts,
    Exceptions,
}

impl DecisionCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Violations,
        Self::Roles,
        Self::RoleHierarchies,
        Self::Permits,
        Self::Requirements,
        Self::Capabilities,
        Self::Scopes,
        Self::Profiles,
        Self::AccountGroupMemberships,
        Self::AccountGroupPermissions,
        Self::Accounts,
        Self::Exceptions,
    ];

    /// Picks the bucket for an item. Exceptions on account-group
    /// permission reviews are counted as permissions.
    #[must_use]
    pub const fn for_item(cert_type: CertificationType, item_type: CertificationItemType) -> Self {
        match item_type {
            CertificationItemType::PolicyViolation => Self::Violations,
            CertificationItemType::Bundle => Self::Roles,
            CertificationItemType::BusinessRoleHierarchy => Self::RoleHierarchies,
            CertificationItemType::BusinessRolePermit => Self::Permits,
            CertificationItemType::BusinessRoleRequirement => Self::Requirements,
            CertificationItemType::BusinessRoleGrantedCapability => Self::Capabilities,
            CertificationItemType::BusinessRoleGrantedScope => Self::Scopes,
            CertificationItemType::BusinessRoleProfile => Self::Profiles,
            CertificationItemType::AccountGroupMembership => Self::AccountGroupMemberships,
            CertificationItemType::Account => Self::Accounts,
            CertificationItemType::DataOwner | CertificationItemType::Exception => {
                if matches!(cert_type, CertificationType::AccountGroupPermissions) {
                    Self::AccountGroupPermissions
                } else {
                    Self::Exceptions
                }
            }
        }
    }

    /// Returns the camel-case name used in XML.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Violations => "violations",
            Self::Roles => "roles",
            Self::RoleHierarchies => "roleHierarchies",
            Self::Permits => "permits",
            Self::Requirements => "requirements",
            Self::Capabilities => "capabilities",
            Self::Scopes => "scopes",
            Self::Profiles => "profiles",
            Self::AccountGroupMemberships => "accountGroupMemberships",
            Self::AccountGroupPermissions => "accountGroupPermissions",
            Self::Accounts => "accounts",
            Self::Exceptions => "exceptions",
        }
    }

    /// Parses a camel-case name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    const fn tracks_allowed(self) -> bool {
        matches!(
            self,
            Self::Violations | Self::Roles | Self::Accounts | Self::Exceptions
        )
    }
}

/// Counters for one decision category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionCounts {
    /// Decisions made.
    pub total: u32,
    /// Access kept.
    pub approved: u32,
    /// Access allowed as an exception (mitigated).
    pub allowed: u32,
    /// Access removed.
    pub remediated: u32,
    /// Violation acknowledged.
    pub acknowledged: u32,
}

/// Progress counters for a certification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationStatistics {
    // === Entities ===
    /// Identities (or other entities) under review.
    pub total_entities: u32,
    /// Entities excluded by rule.
    pub excluded_entities: u32,
    /// Entities with every item decided.
    pub completed_entities: u32,
    /// Entities with at least one delegated item.
    pub delegated_entities: u32,
    /// Stored percentage of completed entities.
    pub percent_complete: u32,
    /// Entities signed off.
    pub certified_entities: u32,
    /// Entities that still need a decision.
    pub certification_required_entities: u32,
    /// Entities past due.
    pub overdue_entities: u32,

    // === Items ===
    /// Items under review.
    pub total_items: u32,
    /// Items excluded by rule.
    pub excluded_items: u32,
    /// Items decided.
    pub completed_items: u32,
    /// Items delegated.
    pub delegated_items: u32,
    /// Stored percentage of completed items.
    pub item_percent_complete: u32,
    /// Items signed off.
    pub certified_items: u32,
    /// Items that still need a decision.
    pub certification_required_items: u32,
    /// Items past due.
    pub overdue_items: u32,

    // === Remediation ===
    /// Remediations started.
    pub remediations_kicked_off: u32,
    /// Remediations finished.
    pub remediations_completed: u32,

    /// Decision counters by category.
    pub decisions: BTreeMap<DecisionCategory, DecisionCounts>,
}

impl CertificationStatistics {
    /// Entities neither delegated nor completed.
    #[must_use]
    pub fn open_entities(&self) -> i64 {
        i64::from(self.total_entities)
            - i64::from(self.delegated_entities)
            - i64::from(self.completed_entities)
    }

    /// Items neither delegated nor completed.
    #[must_use]
    pub fn open_items(&self) -> i64 {
        i64::from(self.total_items) - i64::from(self.delegated_items) - i64::from(self.completed_items)
    }

    /// Recomputes and stores both percentages.
    pub fn save_percent_complete(&mut self) {
        self.percent_complete = calculate_percent_complete(self.completed_entities, self.total_entities);
        self.item_percent_complete = calculate_percent_complete(self.completed_items, self.total_items);
    }

    /// Percentage of started remediations that have finished.
    #[must_use]
    pub const fn remediations_percent_complete(&self) -> u32 {
        calculate_percent_complete(self.remediations_completed, self.remediations_kicked_off)
    }

    /// Adds `count` decisions of `status` on items of `item_type`.
    pub fn increment_decision_count(
        &mut self,
        cert_type: CertificationType,
        item_type: CertificationItemType,
        status: DecisionStatus,
        count: u32,
    ) {
        let category = DecisionCategory::for_item(cert_type, item_type);
        let counts = self.decisions.entry(category).or_default();
        counts.total = counts.total.saturating_add(count);
        let bucket = match status {
            DecisionStatus::Approved if category != DecisionCategory::Violations => &mut counts.approved,
            DecisionStatus::Remediated => &mut counts.remediated,
            DecisionStatus::Mitigated if category.tracks_allowed() => &mut counts.allowed,
            DecisionStatus::Acknowledged if category == DecisionCategory::Violations => {
                &mut counts.acknowledged
            }
            _ => return,
        };
        *bucket = bucket.saturating_add(count);
    }

    /// Returns the counters for a category.
    #[must_use]
    pub fn decision_counts(&self, category: DecisionCategory) -> DecisionCounts {
        self.decisions.get(&category).copied().unwrap_or_default()
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Progress on a single slice of a certification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationStatistic {
    /// Items in the slice.
    pub total: u32,
    /// Items decided.
    pub completed: u32,
    /// Items past due.
    pub overdue: u32,
    /// Items delegated.
    pub delegated: u32,
}

impl CertificationStatistic {
    /// Creates a statistic.
    #[must_use]
    pub const fn new(total: u32, completed: u32, overdue: u32, delegated: u32) -> Self {
        Self {
            total,
            completed,
            overdue,
            delegated,
        }
    }

    /// Items neither overdue nor completed.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        i64::from(self.total) - i64::from(self.overdue) - i64::from(self.completed)
    }

    /// Percentage of completed items.
    #[must_use]
    pub const fn percent_complete(&self) -> u32 {
        calculate_percent_complete(self.completed, self.total)
    }
}

/// An access review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    /// Common object fields.
    pub header: ObjectHeader,

    // === Definition ===
    /// Short name shown in lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Who launched the review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Names of the certifiers.
    pub certifiers: Vec<String>,
    /// What is reviewed.
    pub cert_type: CertificationType,

    // === Lifecycle ===
    /// Current phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<CertificationPhase>,
    /// When the certifiers signed off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<DateTime<Utc>>,
    /// When the review finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<DateTime<Utc>>,
    /// When the review is due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,

    /// Progress counters.
    pub statistics: CertificationStatistics,

    // === Reassignment ===
    /// This review was created by reassigning self-certification items.
    pub self_certification_reassignment: bool,
    /// Certifiers may review their own access.
    pub allow_self_certification: bool,
    /// Reassignments are limited.
    pub limit_reassignments: bool,
    /// Maximum reassignments when limited.
    pub reassignment_limit: u32,
    /// Reassignments made so far.
    pub reassignment_count: u32,

    /// Work items created for this review.
    pub work_items: Vec<String>,

    /// Extended attributes.
    pub attributes: Attributes,
}

persistent_object!(Certification {
    with_attributes!();
});

impl Certification {
    /// Creates a certification.
    #[must_use]
    pub fn new(name: impl Into<String>, cert_type: CertificationType) -> Self {
        Self {
            header: ObjectHeader::named(name),
            cert_type,
            ..Self::default()
        }
    }

    /// Adds a certifier.
    #[must_use]
    pub fn with_certifier(mut self, name: impl Into<String>) -> Self {
        self.certifiers.push(name.into());
        self
    }

    /// Whether every entity has been decided.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.statistics.total_entities > 0
            && self.statistics.completed_entities >= self.statistics.total_entities
    }

    /// Whether the certifiers have signed off.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signed.is_some()
    }

    /// Whether the review is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.is_some() || self.phase == Some(CertificationPhase::End)
    }

    /// Whether no more reassignments are allowed.
    #[must_use]
    pub const fn limit_reassignment_reached(&self) -> bool {
        self.limit_reassignments && self.reassignment_count >= self.reassignment_limit
    }

    /// Checks that `certifier` may review access held by `identity`.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::SelfCertification` when they are the same
    /// person and self certification is not allowed.
    pub fn check_certifier(&self, certifier: &str, identity: &str) -> ModelResult<()> {
        if !self.allow_self_certification && certifier == identity {
            return Err(ModelError::SelfCertification {
                identity: identity.to_string(),
            });
        }
        Ok(())
    }

    /// Records a reassignment of work to `new_certifier` for items about
    /// `identity`.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::LimitReassignment` when the limit is reached,
    /// or `ModelError::SelfCertification` if the new certifier would
    /// review their own access.
    pub fn reassign(&mut self, new_certifier: &str, identity: &str) -> ModelResult<()> {
        if self.limit_reassignment_reached() {
            return Err(ModelError::LimitReassignment);
        }
        self.check_certifier(new_certifier, identity)?;
        self.reassignment_count += 1;
        if !self.certifiers.iter().any(|c| c == new_certifier) {
            self.certifiers.push(new_certifier.to_string());
        }
        Ok(())
    }

    /// Signs off the review.
    pub fn sign(&mut self, at: DateTime<Utc>) {
        self.signed = Some(at);
    }
}
