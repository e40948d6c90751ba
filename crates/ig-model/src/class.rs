//! Object classes.
//!
//! Every persisted record belongs to exactly one [`ObjectClass`]. The class
//! name is what appears in XML (`<Identity>`, `class="sailpoint.object.Identity"`)
//! and what callers pass to the resolver when they only have a string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Package prefix used by qualified class names.
pub const CLASS_PREFIX: &str = "sailpoint.object.";

/// The kinds of persistent objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectClass {
    /// A person or workgroup.
    Identity,
    /// A managed system.
    Application,
    /// An account on an application.
    Link,
    /// A role.
    Bundle,
    /// An entitlement catalogue entry.
    ManagedAttribute,
    /// A unit of human work.
    WorkItem,
    /// A completed work item.
    WorkItemArchive,
    /// An access review.
    Certification,
    /// A compliance policy.
    Policy,
    /// A detected policy violation.
    PolicyViolation,
    /// An authorization scope.
    Scope,
    /// A server in the cluster.
    Server,
    /// A statistic sampled from a server.
    ServerStatistic,
    /// A piece of executable logic.
    Rule,
    /// A task template.
    TaskDefinition,
    /// The outcome of a task run.
    TaskResult,
}

impl ObjectClass {
    /// Every object class, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Identity,
        Self::Application,
        Self::Link,
        Self::Bundle,
        Self::ManagedAttribute,
        Self::WorkItem,
        Self::WorkItemArchive,
        Self::Certification,
        Self::Policy,
        Self::PolicyViolation,
        Self::Scope,
        Self::Server,
        Self::ServerStatistic,
        Self::Rule,
        Self::TaskDefinition,
        Self::TaskResult,
    ];

    /// Returns the simple class name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Application => "Application",
            Self::Link => "Link",
            Self::Bundle => "Bundle",
            Self::ManagedAttribute => "ManagedAttribute",
            Self::WorkItem => "WorkItem",
            Self::WorkItemArchive => "WorkItemArchive",
            Self::Certification => "Certification",
            Self::Policy => "Policy",
            Self::PolicyViolation => "PolicyViolation",
            Self::Scope => "Scope",
            Self::Server => "Server",
            Self::ServerStatistic => "ServerStatistic",
            Self::Rule => "Rule",
            Self::TaskDefinition => "TaskDefinition",
            Self::TaskResult => "TaskResult",
        }
    }

    /// Returns the fully qualified class name.
    #[must_use]
    pub fn qualified_name(self) -> String {
        format!("{CLASS_PREFIX}{}", self.as_str())
    }

    /// Looks up a class by simple or qualified name.
    ///
    /// Matching is case-insensitive on the simple name so that console
    /// input like `identity` works.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let simple = name.strip_prefix(CLASS_PREFIX).unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(simple))
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectClass {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ModelError::UnknownClass(s.to_string()))
    }
}
