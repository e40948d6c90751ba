//! Task execution context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ig_storage::ObjectStore;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::rule::{RuleLibrary, RuleRunner};

/// Everything a task executor can reach while it runs.
///
/// A context represents one unit of work. It is created by whoever
/// launches tasks and handed to each executor by reference.
pub struct TaskContext {
    /// Unique context identifier.
    id: Uuid,

    /// Store the task reads and writes.
    store: Arc<dyn ObjectStore>,

    /// Runner for rules referenced by task arguments.
    rules: Arc<dyn RuleRunner>,

    /// Name of the identity launching tasks.
    launcher: Option<String>,

    /// Scratch values shared between executors.
    attributes: RwLock<HashMap<String, String>>,
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("id", &self.id)
            .field("launcher", &self.launcher)
            .finish_non_exhaustive()
    }
}

impl TaskContext {
    /// Creates a context over a store with an empty rule library.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            id: Uuid::now_v7(),
            store,
            rules: Arc::new(RuleLibrary::new()),
            launcher: None,
            attributes: RwLock::new(HashMap::new()),
        }
    }

    /// Sets the rule runner.
    #[must_use]
    pub fn with_rules(mut self, rules: Arc<dyn RuleRunner>) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the launcher name.
    #[must_use]
    pub fn with_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    /// Returns the context ID.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Returns the rule runner.
    #[must_use]
    pub fn rules(&self) -> &dyn RuleRunner {
        self.rules.as_ref()
    }

    /// Returns the launcher name.
    #[must_use]
    pub fn launcher(&self) -> Option<&str> {
        self.launcher.as_deref()
    }

    /// Sets a context attribute.
    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.write().insert(key.into(), value.into());
    }

    /// Gets a context attribute.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<String> {
        self.attributes.read().get(key).cloned()
    }

    /// Removes a context attribute.
    pub fn remove_attribute(&self, key: &str) -> Option<String> {
        self.attributes.write().remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ig_storage::InMemoryStore;

    #[test]
    fn context_has_unique_id() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryStore::new());
        let a = TaskContext::new(store.clone());
        let b = TaskContext::new(store);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn attributes_and_launcher() {
        let ctx = TaskContext::new(Arc::new(InMemoryStore::new())).with_launcher("spadmin");
        assert_eq!(ctx.launcher(), Some("spadmin"));

        ctx.set_attribute("phase", "scan");
        assert_eq!(ctx.get_attribute("phase"), Some("scan".to_string()));
        assert_eq!(ctx.remove_attribute("phase"), Some("scan".to_string()));
        assert!(ctx.get_attribute("phase").is_none());
    }
}
