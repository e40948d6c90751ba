//! Cascading deletes.
//!
//! The [`Terminator`] is a [`Visitor`] that removes an object from the
//! store together with the references other objects hold to it. Objects
//! that cannot exist without the deleted one (accounts of a deleted
//! identity or application, work items owned by a deleted identity) are
//! deleted too.

use async_trait::async_trait;
use ig_core::AuditAction;
use ig_model::{
    AnyObject, Application, Bundle, Entity, Identity, Link, ManagedAttribute, PersistentObject,
    Policy, Reference, Visitor, WorkItem,
};
use tracing::{debug, info};

use crate::audit::object_event;
use crate::error::{StorageError, StorageResult};
use crate::store::{list_of, ObjectStore};

/// Deletes objects and prunes references to them.
pub struct Terminator<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    source: String,
    deleted: Vec<Reference>,
    pruned: usize,
}

impl<'a, S: ObjectStore + ?Sized> Terminator<'a, S> {
    /// Creates a terminator working on `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            source: String::new(),
            deleted: Vec::new(),
            pruned: 0,
        }
    }

    /// Sets the name recorded on prune audit events.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Deletes an object and everything that depends on it.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::InvalidData` if the object was never saved, or
    /// whatever the store reports.
    pub async fn delete_object(&mut self, object: &AnyObject) -> StorageResult<()> {
        object.accept(self).await
    }

    /// References to every object deleted so far, in deletion order.
    #[must_use]
    pub fn deleted(&self) -> &[Reference] {
        &self.deleted
    }

    /// Number of objects that had a reference pruned.
    #[must_use]
    pub const fn pruned_count(&self) -> usize {
        self.pruned
    }

    async fn remove(&mut self, object: &dyn PersistentObject) -> StorageResult<()> {
        let id = object.id().ok_or_else(|| {
            StorageError::InvalidData(format!("{} has no id", object.reference().display_name()))
        })?;
        self.store.remove(object.object_class(), id).await?;
        info!(
            class = %object.object_class(),
            id,
            name = object.name().unwrap_or_default(),
            "Deleted object"
        );
        self.deleted.push(object.reference());
        Ok(())
    }

    /// Applies `prune` to every object of type `T` and saves the ones it
    /// changed.
    async fn prune_all<T, F>(&mut self, target: &Reference, prune: F) -> StorageResult<()>
    where
        T: Entity,
        F: Fn(&mut T) -> bool + Send + Sync,
    {
        for mut object in list_of::<T, S>(self.store).await? {
            if !prune(&mut object) {
                continue;
            }
            debug!(
                class = %T::CLASS,
                name = object.name().unwrap_or_default(),
                reference = target.display_name(),
                "Pruned reference"
            );
            let saved = self.store.save(object.into()).await?;
            let mut event =
                object_event(AuditAction::PruneReference, saved.as_persistent(), &self.source);
            event.details.push((
                "reference".to_string(),
                format!("{}:{}", target.class, target.display_name()),
            ));
            self.store.audit_log().record(event);
            self.pruned += 1;
        }
        Ok(())
    }

    /// Deletes every object of type `T` that `depends` selects.
    async fn cascade<T, F>(&mut self, depends: F) -> StorageResult<()>
    where
        T: Entity,
        F: Fn(&T) -> bool + Send + Sync,
    {
        for object in list_of::<T, S>(self.store).await? {
            if depends(&object) {
                self.remove(&object).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<'a, S: ObjectStore + ?Sized> Visitor for Terminator<'a, S> {
    type Error = StorageError;

    async fn visit_object(&mut self, obj: &dyn PersistentObject) -> StorageResult<()> {
        self.remove(obj).await
    }

    async fn visit_bundle(&mut self, obj: &Bundle) -> StorageResult<()> {
        let role = obj.reference();
        self.prune_all::<Bundle, _>(&role, |b| b.prune_role(&role)).await?;
        self.prune_all::<Identity, _>(&role, |i| i.remove_role(&role)).await?;
        self.prune_all::<Policy, _>(&role, |p| p.prune_role(&role)).await?;
        self.remove(obj).await
    }

    async fn visit_identity(&mut self, obj: &Identity) -> StorageResult<()> {
        let identity = obj.reference();
        self.cascade::<Link, _>(|l| l.is_owned_by(&identity)).await?;
        self.cascade::<WorkItem, _>(|w| {
            w.header.owner.as_ref().is_some_and(|o| o.same_target(&identity))
        })
        .await?;
        self.prune_all::<Identity, _>(&identity, |i| {
            if i.is_managed_by(&identity) {
                i.manager = None;
                true
            } else {
                false
            }
        })
        .await?;
        self.prune_all::<Application, _>(&identity, |a| a.remove_remediator(&identity))
            .await?;
        self.remove(obj).await
    }

    async fn visit_application(&mut self, obj: &Application) -> StorageResult<()> {
        let app = obj.reference();
        for link in list_of::<Link, S>(self.store).await? {
            if link.is_on(&app) {
                self.visit_link(&link).await?;
            }
        }
        self.cascade::<ManagedAttribute, _>(|m| m.is_on(&app)).await?;
        self.prune_all::<Application, _>(&app, |a| a.remove_dependency(&app))
            .await?;
        self.remove(obj).await
    }

    async fn visit_link(&mut self, obj: &Link) -> StorageResult<()> {
        let link = obj.reference();
        self.prune_all::<Identity, _>(&link, |i| i.remove_link(&link)).await?;
        self.remove(obj).await
    }
}
