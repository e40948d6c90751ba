//! Task definition and task result domain models.
//!
//! A task definition names the executor to run and the arguments to pass.
//! Each run produces a [`TaskResult`] whose completion status is derived
//! from the messages the executor left on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::{AttrValue, Attributes};
use crate::macros::str_enum;
use crate::object::{persistent_object, with_attributes, ObjectHeader, PersistentObject};
use crate::reference::Reference;

/// A task template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDefinition {
    /// Common object fields.
    pub header: ObjectHeader,
    /// Registered name of the executor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    /// Task type used for grouping (e.g. "Housekeeping").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    /// Arguments passed to the executor.
    pub arguments: Attributes,
}

persistent_object!(TaskDefinition {
    fn attributes(&self) -> Option<&Attributes> {
        Some(&self.arguments)
    }

    fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        Some(&mut self.arguments)
    }
});

impl TaskDefinition {
    /// Creates a definition run by the named executor.
    #[must_use]
    pub fn new(name: impl Into<String>, executor: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::named(name),
            executor: Some(executor.into()),
            ..Self::default()
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.arguments.put(key, value);
        self
    }
}

/// How a task run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionStatus {
    /// Ran without problems.
    Success,
    /// Ran, but left warnings.
    Warning,
    /// Ran into errors.
    Error,
    /// Stopped before finishing.
    Terminated,
}

str_enum!(CompletionStatus {
    Success => "Success",
    Warning => "Warning",
    Error => "Error",
    Terminated => "Terminated",
});

/// Severity of a task message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
}

str_enum!(MessageLevel {
    Info => "Info",
    Warn => "Warn",
    Error => "Error",
});

/// A message left by an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    /// Severity.
    pub level: MessageLevel,
    /// Text.
    pub text: String,
}

/// The outcome of a task run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskResult {
    /// Common object fields; the name is usually the definition's name.
    pub header: ObjectHeader,
    /// Definition that was run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Reference>,
    /// Who launched the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launcher: Option<String>,
    /// When the run started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launched: Option<DateTime<Utc>>,
    /// When the run ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
    /// Final status, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<CompletionStatus>,
    /// The run was stopped early.
    pub terminated: bool,
    /// Messages, oldest first.
    pub messages: Vec<TaskMessage>,
    /// Values the executor returned.
    pub attributes: Attributes,
}

persistent_object!(TaskResult {
    with_attributes!();
});

impl TaskResult {
    /// Creates a result for a run of `definition`, launched now.
    #[must_use]
    pub fn for_definition(definition: &TaskDefinition, launcher: Option<&str>) -> Self {
        Self {
            header: ObjectHeader {
                name: definition.header.name.clone(),
                ..ObjectHeader::default()
            },
            definition: Some(definition.reference()),
            launcher: launcher.map(ToString::to_string),
            launched: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Adds an informational message.
    pub fn add_info(&mut self, text: impl Into<String>) {
        self.add_message(MessageLevel::Info, text);
    }

    /// Adds a warning.
    pub fn add_warning(&mut self, text: impl Into<String>) {
        self.add_message(MessageLevel::Warn, text);
    }

    /// Adds an error.
    pub fn add_error(&mut self, text: impl Into<String>) {
        self.add_message(MessageLevel::Error, text);
    }

    fn add_message(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.messages.push(TaskMessage {
            level,
            text: text.into(),
        });
    }

    /// Whether any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }

    /// Whether any warning was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Warn)
    }

    /// Derives the status. Termination wins over errors, errors over
    /// warnings.
    #[must_use]
    pub fn calculate_completion_status(&self) -> CompletionStatus {
        if self.terminated {
            CompletionStatus::Terminated
        } else if self.has_errors() {
            CompletionStatus::Error
        } else if self.has_warnings() {
            CompletionStatus::Warning
        } else {
            CompletionStatus::Success
        }
    }

    /// Stamps the completion time and status.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = Some(at);
        self.completion_status = Some(self.calculate_completion_status());
    }

    /// Run length in milliseconds, once complete.
    #[must_use]
    pub fn run_length_millis(&self) -> Option<i64> {
        match (self.launched, self.completed) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}
