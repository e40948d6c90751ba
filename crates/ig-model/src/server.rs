//! Server and server statistic domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::object::{persistent_object, with_attributes, ObjectHeader};
use crate::reference::Reference;

/// A server in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Common object fields; the name is the host name.
    pub header: ObjectHeader,
    /// Last heartbeat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<DateTime<Utc>>,
    /// Server has stopped sending heartbeats.
    pub inactive: bool,
    /// Runtime details (services, memory, versions).
    pub attributes: Attributes,
}

persistent_object!(Server {
    with_attributes!();
});

impl Server {
    /// Creates a server record for a host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::named(host),
            ..Self::default()
        }
    }

    /// Records a heartbeat and marks the server active.
    pub fn beat(&mut self, at: DateTime<Utc>) {
        self.heartbeat = Some(at);
        self.inactive = false;
    }

    /// Whether the last heartbeat is older than `timeout`.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.heartbeat.map_or(true, |beat| now - beat > timeout)
    }
}

/// A statistic sampled from a server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStatistic {
    /// Common object fields.
    pub header: ObjectHeader,
    /// Server the value was sampled on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Reference>,
    /// Name of the sampling run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_name: Option<String>,
    /// Sampled value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Type of the value (e.g. "int", "percent").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// What was measured (e.g. an application name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Kind of target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    /// Extra sample data.
    pub attributes: Attributes,
}

persistent_object!(ServerStatistic {
    with_attributes!();

    fn is_name_unique(&self) -> bool {
        false
    }

    fn has_assigned_scope(&self) -> bool {
        false
    }
});

impl ServerStatistic {
    /// Creates a sample for a server.
    #[must_use]
    pub fn new(host: Reference, snapshot_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            host: Some(host),
            snapshot_name: Some(snapshot_name.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// The value parsed as a number.
    #[must_use]
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_deref().and_then(|v| v.trim().parse().ok())
    }
}
