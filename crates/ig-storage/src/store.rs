//! Object store trait.

use std::sync::Arc;

use async_trait::async_trait;
use ig_model::{AnyObject, Entity, ObjectClass};

use crate::audit::AuditLog;
use crate::error::{StorageError, StorageResult};
use crate::resolver::Resolver;

/// Predicate used by [`ObjectStore::find`].
pub type ObjectFilter<'a> = &'a (dyn Fn(&AnyObject) -> bool + Send + Sync);

/// Storage for persistent objects of every class.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait ObjectStore: Resolver {
    /// Saves an object and returns the stored copy.
    ///
    /// Objects without an id get one. `created` is stamped on first save
    /// and `modified` on every later save.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if another object of the class
    /// already has the same unique name or unique key.
    async fn save(&self, object: AnyObject) -> StorageResult<AnyObject>;

    /// Removes an object by id and returns it.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the object doesn't exist.
    async fn remove(&self, class: ObjectClass, id: &str) -> StorageResult<AnyObject>;

    /// Lists every object of a class, ordered by name then id.
    async fn list(&self, class: ObjectClass) -> StorageResult<Vec<AnyObject>>;

    /// Counts objects of a class.
    async fn count(&self, class: ObjectClass) -> StorageResult<usize>;

    /// Lists the objects of a class that match `filter`.
    async fn find(&self, class: ObjectClass, filter: ObjectFilter<'_>) -> StorageResult<Vec<AnyObject>>;

    /// Returns the sink the store records audit events to.
    fn audit_log(&self) -> Arc<dyn AuditLog>;
}

/// Gets an object by id as a concrete type.
///
/// ## Errors
///
/// Returns the store's error, or `StorageError::Model` if the stored object
/// is of another class.
pub async fn get_by_id<T, S>(store: &S, id: &str) -> StorageResult<Option<T>>
where
    T: Entity,
    S: ObjectStore + ?Sized,
{
    store
        .get_object_by_id(T::CLASS, id)
        .await?
        .map(|obj| obj.downcast::<T>().map_err(StorageError::from))
        .transpose()
}

/// Gets an object by name as a concrete type.
///
/// ## Errors
///
/// Returns the store's error, or `StorageError::Model` if the stored object
/// is of another class.
pub async fn get_by_name<T, S>(store: &S, name: &str) -> StorageResult<Option<T>>
where
    T: Entity,
    S: ObjectStore + ?Sized,
{
    store
        .get_object_by_name(T::CLASS, name)
        .await?
        .map(|obj| obj.downcast::<T>().map_err(StorageError::from))
        .transpose()
}

/// Lists every object of a concrete type.
///
/// ## Errors
///
/// Returns the store's error.
pub async fn list_of<T, S>(store: &S) -> StorageResult<Vec<T>>
where
    T: Entity,
    S: ObjectStore + ?Sized,
{
    store
        .list(T::CLASS)
        .await?
        .into_iter()
        .map(|obj| obj.downcast::<T>().map_err(StorageError::from))
        .collect()
}

/// Saves a concrete object and returns the stored copy.
///
/// ## Errors
///
/// Returns the store's error.
pub async fn save_typed<T, S>(store: &S, object: T) -> StorageResult<T>
where
    T: Entity,
    S: ObjectStore + ?Sized,
{
    Ok(store.save(object.into()).await?.downcast::<T>()?)
}
