//! Audit sinks.
//!
//! Stores describe every change as an [`AuditEvent`] and hand it to an
//! [`AuditLog`]. Two sinks are provided: one that keeps events in memory
//! for inspection and one that writes them to `tracing`.

use std::fmt::Debug;

use ig_core::event::SYSTEM_SOURCE;
use ig_core::{AuditAction, AuditEvent};
use ig_model::PersistentObject;
use parking_lot::RwLock;

/// Receives audit events.
pub trait AuditLog: Debug + Send + Sync {
    /// Records an event.
    fn record(&self, event: AuditEvent);
}

/// Builds an event describing `action` on `object`.
#[must_use]
pub fn object_event(action: AuditAction, object: &dyn PersistentObject, source: &str) -> AuditEvent {
    AuditEvent::builder(action)
        .source(if source.is_empty() { SYSTEM_SOURCE } else { source })
        .target(object.audit_class_name(), object.id(), object.name())
        .build()
}

// ============================================================================
// In-Memory Log
// ============================================================================

/// Keeps events in memory, oldest first.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Returns the events with the given action.
    #[must_use]
    pub fn events_for(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns whether no events were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, event: AuditEvent) {
        self.events.write().push(event);
    }
}

// ============================================================================
// Tracing Log
// ============================================================================

/// Writes events to the tracing framework at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLog;

impl TracingAuditLog {
    /// Creates a new tracing log.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditLog for TracingAuditLog {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            event_id = %event.id,
            action = event.action.as_str(),
            outcome = ?event.outcome,
            source = %event.source,
            target_class = ?event.target_class,
            target_id = ?event.target_id,
            target_name = ?event.target_name,
            error = ?event.error,
            "audit_event"
        );
    }
}
