//! Audit events.
//!
//! Every change the object store makes on behalf of a caller is described
//! by an [`AuditEvent`]: who did it (`source`), what happened (`action`)
//! and which object was affected (`target_*`). Events are plain records;
//! where they go is decided by the store that produces them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source recorded when no caller identity is known.
pub const SYSTEM_SOURCE: &str = "System";

/// Audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditAction {
    /// Object created.
    Create,
    /// Object updated.
    Update,
    /// Object deleted.
    Delete,
    /// Object imported from XML.
    Import,
    /// Object exported to XML.
    Export,
    /// A reference was pruned from another object during a delete.
    PruneReference,
    /// Task executed.
    RunTask,
}

impl AuditAction {
    /// Returns the action name as written to audit logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::Export => "export",
            Self::PruneReference => "pruneReference",
            Self::RunTask => "runTask",
        }
    }
}

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// An audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Time the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub action: AuditAction,
    /// Outcome of the action.
    pub outcome: AuditOutcome,
    /// Name of the identity (or subsystem) that caused the event.
    pub source: String,
    /// Class of the affected object.
    pub target_class: Option<String>,
    /// Id of the affected object.
    pub target_id: Option<String>,
    /// Name of the affected object.
    pub target_name: Option<String>,
    /// Error message for failures.
    pub error: Option<String>,
    /// Additional key/value details.
    pub details: Vec<(String, String)>,
}

impl AuditEvent {
    /// Creates a new event builder.
    #[must_use]
    pub fn builder(action: AuditAction) -> AuditEventBuilder {
        AuditEventBuilder::new(action)
    }

    /// Returns the value of a detail, if present.
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    action: AuditAction,
    outcome: AuditOutcome,
    source: String,
    target_class: Option<String>,
    target_id: Option<String>,
    target_name: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl AuditEventBuilder {
    /// Creates a builder for a successful system event.
    #[must_use]
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            outcome: AuditOutcome::Success,
            source: SYSTEM_SOURCE.to_string(),
            target_class: None,
            target_id: None,
            target_name: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Marks the event as failed.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = AuditOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the source.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the affected object.
    #[must_use]
    pub fn target(
        mut self,
        class: impl Into<String>,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Self {
        self.target_class = Some(class.into());
        self.target_id = id.map(ToString::to_string);
        self.target_name = name.map(ToString::to_string);
        self
    }

    /// Adds a detail.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> AuditEvent {
        AuditEvent {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            action: self.action,
            outcome: self.outcome,
            source: self.source,
            target_class: self.target_class,
            target_id: self.target_id,
            target_name: self.target_name,
            error: self.error,
            details: self.details,
        }
    }
}
