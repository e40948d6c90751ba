//! Registry of task executors.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use ig_core::event::{AuditAction, AuditEvent, SYSTEM_SOURCE};
use ig_model::{Attributes, PersistentObject, TaskDefinition, TaskResult};
use ig_storage::store::{get_by_name, save_typed};
use tracing::{info, warn};

use crate::builtin::{PruneWorkItemsExecutor, PRUNE_WORK_ITEMS};
use crate::context::TaskContext;
use crate::error::{SpiError, SpiResult};
use crate::executor::TaskExecutor;

/// Registry of task executors, keyed by the executor name a
/// [`TaskDefinition`] refers to.
#[derive(Debug, Default)]
pub struct ExecutorRegistry {
    executors: DashMap<String, Arc<dyn TaskExecutor>>,
}

impl ExecutorRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in executors.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry
            .executors
            .insert(PRUNE_WORK_ITEMS.to_string(), Arc::new(PruneWorkItemsExecutor::new()));
        registry
    }

    /// Registers an executor.
    ///
    /// ## Errors
    ///
    /// Returns `SpiError::AlreadyRegistered` if the name is taken.
    pub fn register(&self, name: impl Into<String>, executor: Arc<dyn TaskExecutor>) -> SpiResult<()> {
        let name = name.into();
        match self.executors.entry(name) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                Err(SpiError::AlreadyRegistered(entry.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(executor);
                Ok(())
            }
        }
    }

    /// Looks up an executor by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn TaskExecutor>> {
        self.executors.get(name).map(|e| Arc::clone(e.value()))
    }

    /// Lists registered executor names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.executors.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Checks if an executor is registered.
    #[must_use]
    pub fn has_executor(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    /// Asks the named executor to stop. Returns whether it accepted.
    #[must_use]
    pub fn terminate(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|e| e.terminate())
    }

    /// Runs a task definition and returns its completed result.
    ///
    /// Arguments are the definition's own merged with `overrides`. Errors
    /// raised by the executor are recorded on the result rather than
    /// returned, and the result is saved to the context's store.
    ///
    /// ## Errors
    ///
    /// Returns `SpiError::NoExecutor` if the definition names no executor,
    /// `SpiError::ExecutorNotFound` if the executor is not registered, and
    /// `SpiError::Storage` if the result cannot be saved.
    pub async fn run(
        &self,
        ctx: &TaskContext,
        definition: &TaskDefinition,
        overrides: Option<&Attributes>,
    ) -> SpiResult<TaskResult> {
        let task_name = definition.name().unwrap_or_default().to_string();
        let executor_name = definition
            .executor
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| SpiError::NoExecutor(task_name.clone()))?;
        let executor = self
            .lookup(executor_name)
            .ok_or_else(|| SpiError::ExecutorNotFound(executor_name.to_string()))?;

        let mut args = definition.arguments.clone();
        if let Some(overrides) = overrides {
            args.merge(overrides);
        }

        let mut result = TaskResult::for_definition(definition, ctx.launcher());
        info!(task = %task_name, executor = executor_name, context = %ctx.id(), "Launching task");

        if let Err(e) = executor.execute(ctx, definition, &args, &mut result).await {
            warn!(task = %task_name, error = %e, "Task failed");
            result.add_error(e.to_string());
        }
        result.complete(Utc::now());

        // Results are named after their definition; a rerun replaces the
        // previous result.
        if let Some(previous) = get_by_name::<TaskResult, _>(ctx.store(), &task_name).await? {
            result.header.id = previous.header.id;
        }
        let result = save_typed(ctx.store(), result).await?;
        let status = result
            .completion_status
            .map(|s| s.as_str())
            .unwrap_or_default();

        let mut event = AuditEvent::builder(AuditAction::RunTask)
            .source(ctx.launcher().unwrap_or(SYSTEM_SOURCE))
            .target(definition.audit_class_name(), definition.id(), definition.name())
            .detail("executor", executor_name)
            .detail("status", status);
        if result.has_errors() {
            event = event.failure(format!("task '{task_name}' completed with errors"));
        }
        ctx.store().audit_log().record(event.build());

        info!(
            task = %task_name,
            status,
            millis = result.run_length_millis().unwrap_or_default(),
            "Task completed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ig_model::{
        CompletionStatus, ObjectClass, Reference, WorkItem, WorkItemArchive, WorkItemState, WorkItemType,
    };
    use ig_storage::store::list_of;
    use ig_storage::{InMemoryAuditLog, InMemoryStore, ObjectStore};

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl TaskExecutor for Echo {
        async fn execute(
            &self,
            _ctx: &TaskContext,
            _definition: &TaskDefinition,
            args: &Attributes,
            result: &mut TaskResult,
        ) -> SpiResult<()> {
            let msg = args.get_string("message").unwrap_or_default();
            if msg == "fail" {
                return Err(SpiError::invalid_argument("message", "asked to fail"));
            }
            if msg == "warn" {
                result.add_warning("careful");
            }
            result.attributes.put("echo", msg);
            Ok(())
        }
    }

    fn context() -> (TaskContext, Arc<InMemoryAuditLog>) {
        let audit = Arc::new(InMemoryAuditLog::new());
        let store = InMemoryStore::new().with_audit_log(audit.clone());
        (TaskContext::new(Arc::new(store)).with_launcher("spadmin"), audit)
    }

    #[test]
    fn register_and_lookup() {
        let registry = ExecutorRegistry::new();
        registry.register("echo", Arc::new(Echo)).unwrap();

        assert!(registry.has_executor("echo"));
        assert!(registry.lookup("echo").is_some());
        assert!(registry.lookup("missing").is_none());
        assert!(matches!(
            registry.register("echo", Arc::new(Echo)),
            Err(SpiError::AlreadyRegistered(name)) if name == "echo"
        ));
        assert!(!registry.terminate("echo"));
    }

    #[test]
    fn builtins_are_listed() {
        let registry = ExecutorRegistry::with_builtins();
        registry.register("echo", Arc::new(Echo)).unwrap();
        assert_eq!(registry.list(), vec!["echo", PRUNE_WORK_ITEMS]);
        assert!(registry.terminate(PRUNE_WORK_ITEMS));
    }

    #[tokio::test]
    async fn run_merges_overrides_and_saves_result() {
        let (ctx, audit) = context();
        let registry = ExecutorRegistry::new();
        registry.register("echo", Arc::new(Echo)).unwrap();

        let definition = TaskDefinition::new("Echo Task", "echo").with_argument("message", "hi");
        let overrides = Attributes::new().with("message", "warn");
        let result = registry.run(&ctx, &definition, Some(&overrides)).await.unwrap();

        assert_eq!(result.completion_status, Some(CompletionStatus::Warning));
        assert_eq!(result.attributes.get_string("echo"), Some("warn".to_string()));
        assert_eq!(result.launcher.as_deref(), Some("spadmin"));
        assert!(result.id().is_some());
        assert_eq!(ctx.store().count(ObjectClass::TaskResult).await.unwrap(), 1);

        let runs = audit.events_for(AuditAction::RunTask);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].source, "spadmin");
        assert_eq!(runs[0].detail("executor"), Some("echo"));

        let rerun = registry.run(&ctx, &definition, None).await.unwrap();
        assert_eq!(rerun.id(), result.id());
        assert_eq!(rerun.completion_status, Some(CompletionStatus::Success));
        assert_eq!(ctx.store().count(ObjectClass::TaskResult).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn executor_errors_land_on_result() {
        let (ctx, audit) = context();
        let registry = ExecutorRegistry::new();
        registry.register("echo", Arc::new(Echo)).unwrap();

        let definition = TaskDefinition::new("Failing", "echo").with_argument("message", "fail");
        let result = registry.run(&ctx, &definition, None).await.unwrap();
        assert_eq!(result.completion_status, Some(CompletionStatus::Error));
        assert!(result.has_errors());
        assert!(audit.events_for(AuditAction::RunTask)[0].error.is_some());
    }

    #[tokio::test]
    async fn run_rejects_missing_executor() {
        let (ctx, _) = context();
        let registry = ExecutorRegistry::new();

        let err = registry
            .run(&ctx, &TaskDefinition::new("Nothing", "nope"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SpiError::ExecutorNotFound(name) if name == "nope"));

        let mut blank = TaskDefinition::new("Blank", "x");
        blank.executor = None;
        let err = registry.run(&ctx, &blank, None).await.unwrap_err();
        assert!(matches!(err, SpiError::NoExecutor(name) if name == "Blank"));
    }

    #[tokio::test]
    async fn prune_work_items_archives_expired() {
        let (ctx, _) = context();
        let registry = ExecutorRegistry::with_builtins();

        let owner = Reference::by_name(ObjectClass::Identity, "alice");
        let mut expired = WorkItem::new(WorkItemType::Approval, owner.clone());
        expired.state = Some(WorkItemState::Expired);
        let open = WorkItem::new(WorkItemType::Approval, owner);
        ctx.store().save(expired.into()).await.unwrap();
        ctx.store().save(open.into()).await.unwrap();

        let dry = TaskDefinition::new("Prune (dry)", PRUNE_WORK_ITEMS).with_argument("dryRun", true);
        let result = registry.run(&ctx, &dry, None).await.unwrap();
        assert_eq!(result.attributes.get_int("workItemsPruned"), 1);
        assert_eq!(ctx.store().count(ObjectClass::WorkItem).await.unwrap(), 2);

        let real = TaskDefinition::new("Prune", PRUNE_WORK_ITEMS).with_argument("archive", true);
        let result = registry.run(&ctx, &real, None).await.unwrap();
        assert_eq!(result.completion_status, Some(CompletionStatus::Success));
        assert_eq!(result.attributes.get_int("workItemsPruned"), 1);
        assert_eq!(result.attributes.get_int("workItemsArchived"), 1);

        let remaining = list_of::<WorkItem, _>(ctx.store()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].is_open());
        let archives = list_of::<WorkItemArchive, _>(ctx.store()).await.unwrap();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].completer.as_deref(), Some("spadmin"));
    }
}
