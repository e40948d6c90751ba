//! Built-in task executors.

use async_trait::async_trait;
use chrono::Utc;
use ig_model::{Attributes, PersistentObject, TaskDefinition, TaskResult, WorkItem, WorkItemArchive};
use ig_storage::store::{list_of, save_typed};
use ig_storage::Terminator;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::context::TaskContext;
use crate::error::SpiResult;
use crate::executor::TaskExecutor;

/// Registered name of [`PruneWorkItemsExecutor`].
pub const PRUNE_WORK_ITEMS: &str = "prune-work-items";

/// Argument: only report what would be pruned.
pub const ARG_DRY_RUN: &str = "dryRun";
/// Argument: archive each item before deleting it.
pub const ARG_ARCHIVE: &str = "archive";
/// Result attribute: number of items pruned (or that would be).
pub const RET_PRUNED: &str = "workItemsPruned";
/// Result attribute: number of archives written.
pub const RET_ARCHIVED: &str = "workItemsArchived";

/// Deletes expired work items, optionally archiving them first.
#[derive(Debug, Default)]
pub struct PruneWorkItemsExecutor {
    terminated: RwLock<bool>,
}

impl PruneWorkItemsExecutor {
    /// Creates the executor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_terminated(&self) -> bool {
        *self.terminated.read()
    }
}

/// Running totals of a prune run.
#[derive(Debug, Default, Clone, Copy)]
struct PruneCounts {
    pruned: i64,
    archived: i64,
}

impl PruneWorkItemsExecutor {
    async fn prune_expired(
        &self,
        ctx: &TaskContext,
        dry_run: bool,
        archive: bool,
        result: &mut TaskResult,
        counts: &mut PruneCounts,
    ) -> SpiResult<()> {
        let now = Utc::now();
        let store = ctx.store();

        let expired: Vec<WorkItem> = list_of::<WorkItem, _>(store)
            .await?
            .into_iter()
            .filter(|item| item.is_expired(now))
            .collect();
        debug!(count = expired.len(), dry_run, "Found expired work items");

        let mut terminator = Terminator::new(store).with_source(ctx.launcher().unwrap_or_default());
        for item in expired {
            if self.is_terminated() {
                result.terminated = true;
                result.add_warning("terminated before all work items were pruned");
                break;
            }
            if !dry_run {
                if archive {
                    let record = WorkItemArchive::from_work_item(&item, ctx.launcher());
                    save_typed(store, record).await?;
                    counts.archived += 1;
                }
                terminator.delete_object(&item.clone().into()).await?;
            }
            counts.pruned += 1;
            debug!(id = item.id().unwrap_or_default(), "Pruned work item");
        }
        Ok(())
    }
}

#[async_trait]
impl TaskExecutor for PruneWorkItemsExecutor {
    async fn execute(
        &self,
        ctx: &TaskContext,
        _definition: &TaskDefinition,
        args: &Attributes,
        result: &mut TaskResult,
    ) -> SpiResult<()> {
        let dry_run = args.get_boolean(ARG_DRY_RUN);
        let archive = args.get_boolean(ARG_ARCHIVE);

        let mut counts = PruneCounts::default();
        let outcome = self
            .prune_expired(ctx, dry_run, archive, result, &mut counts)
            .await;
        // A termination request covers one run, including one made before it started.
        *self.terminated.write() = false;

        let PruneCounts { pruned, archived } = counts;
        result.attributes.put(RET_PRUNED, pruned);
        result.attributes.put(RET_ARCHIVED, archived);
        outcome?;

        if dry_run {
            result.add_info(format!("{pruned} expired work items would be pruned"));
        } else {
            result.add_info(format!("pruned {pruned} expired work items"));
        }
        info!(pruned, archived, dry_run, "Work item pruning finished");
        Ok(())
    }

    fn terminate(&self) -> bool {
        *self.terminated.write() = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ig_model::{AnyObject, ObjectClass, Reference, WorkItemState, WorkItemType};
    use ig_storage::store::ObjectFilter;
    use ig_storage::{AuditLog, InMemoryStore, ObjectStore, Resolver, StorageError, StorageResult};
    use parking_lot::Mutex;

    use crate::ExecutorRegistry;

    /// Store whose removes start failing after a number of successes.
    struct FlakyStore {
        inner: InMemoryStore,
        removes_left: Mutex<usize>,
    }

    #[async_trait]
    impl Resolver for FlakyStore {
        async fn get_object_by_id(&self, class: ObjectClass, id: &str) -> StorageResult<Option<AnyObject>> {
            self.inner.get_object_by_id(class, id).await
        }

        async fn get_object_by_name(&self, class: ObjectClass, name: &str) -> StorageResult<Option<AnyObject>> {
            self.inner.get_object_by_name(class, name).await
        }
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        async fn save(&self, object: AnyObject) -> StorageResult<AnyObject> {
            self.inner.save(object).await
        }

        async fn remove(&self, class: ObjectClass, id: &str) -> StorageResult<AnyObject> {
            {
                let mut left = self.removes_left.lock();
                if *left == 0 {
                    return Err(StorageError::InvalidData("store is read-only".to_string()));
                }
                *left -= 1;
            }
            self.inner.remove(class, id).await
        }

        async fn list(&self, class: ObjectClass) -> StorageResult<Vec<AnyObject>> {
            self.inner.list(class).await
        }

        async fn count(&self, class: ObjectClass) -> StorageResult<usize> {
            self.inner.count(class).await
        }

        async fn find(&self, class: ObjectClass, filter: ObjectFilter<'_>) -> StorageResult<Vec<AnyObject>> {
            self.inner.find(class, filter).await
        }

        fn audit_log(&self) -> Arc<dyn AuditLog> {
            self.inner.audit_log()
        }
    }

    async fn save_expired(store: &dyn ObjectStore, count: usize) {
        for _ in 0..count {
            let mut item = WorkItem::new(
                WorkItemType::Approval,
                Reference::by_name(ObjectClass::Identity, "alice"),
            );
            item.state = Some(WorkItemState::Expired);
            store.save(item.into()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn termination_before_run_stops_that_run_only() {
        let ctx = TaskContext::new(Arc::new(InMemoryStore::new()));
        save_expired(ctx.store(), 2).await;
        let registry = ExecutorRegistry::with_builtins();
        let definition = TaskDefinition::new("Prune", PRUNE_WORK_ITEMS);

        assert!(registry.terminate(PRUNE_WORK_ITEMS));
        let result = registry.run(&ctx, &definition, None).await.unwrap();
        assert!(result.terminated);
        assert_eq!(result.attributes.get_long("workItemsPruned"), Some(0));
        assert_eq!(ctx.store().count(ObjectClass::WorkItem).await.unwrap(), 2);

        let result = registry.run(&ctx, &definition, None).await.unwrap();
        assert!(!result.terminated);
        assert_eq!(result.attributes.get_long("workItemsPruned"), Some(2));
        assert_eq!(ctx.store().count(ObjectClass::WorkItem).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn counts_are_recorded_when_a_delete_fails() {
        let store = FlakyStore {
            inner: InMemoryStore::new(),
            removes_left: Mutex::new(1),
        };
        let ctx = TaskContext::new(Arc::new(store));
        save_expired(ctx.store(), 2).await;

        let executor = PruneWorkItemsExecutor::new();
        let definition = TaskDefinition::new("Prune", PRUNE_WORK_ITEMS);
        let args = Attributes::new().with(ARG_ARCHIVE, true);
        let mut result = TaskResult::for_definition(&definition, None);

        let err = executor
            .execute(&ctx, &definition, &args, &mut result)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("read-only"));
        assert_eq!(result.attributes.get_long(RET_PRUNED), Some(1));
        assert_eq!(result.attributes.get_long(RET_ARCHIVED), Some(2));
    }
}
