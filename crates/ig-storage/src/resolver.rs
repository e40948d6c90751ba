//! Reference resolution.
//!
//! A [`Resolver`] fetches objects by class and id or name. The
//! [`ReferenceResolver`] sits in front of one and turns the loose
//! `(class name, id, name)` triples found in XML into objects, falling
//! back from id to name.

use std::sync::Arc;

use async_trait::async_trait;
use ig_model::{AnyObject, ObjectClass, Reference};
use tracing::warn;

use crate::error::{StorageError, StorageResult};

/// Looks objects up by id or name.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Gets an object by id.
    async fn get_object_by_id(&self, class: ObjectClass, id: &str)
        -> StorageResult<Option<AnyObject>>;

    /// Gets an object by name.
    async fn get_object_by_name(
        &self,
        class: ObjectClass,
        name: &str,
    ) -> StorageResult<Option<AnyObject>>;
}

/// Resolves references through an inner [`Resolver`].
#[derive(Debug)]
pub struct ReferenceResolver<R: ?Sized> {
    inner: Arc<R>,
}

impl<R: ?Sized> Clone for ReferenceResolver<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resolver + ?Sized> ReferenceResolver<R> {
    /// Creates a resolver in front of `inner`.
    #[must_use]
    pub const fn new(inner: Arc<R>) -> Self {
        Self { inner }
    }

    /// Resolves a reference given as loose parts.
    ///
    /// The id is tried first, then the name. When both are supplied and
    /// the object found by one does not carry the other, a warning is
    /// logged and the object is still returned.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::UnknownClass` if `class_name` is not an object
    /// class, or whatever the inner resolver reports.
    pub async fn resolve(
        &self,
        class_name: &str,
        id: Option<&str>,
        name: Option<&str>,
    ) -> StorageResult<Option<AnyObject>> {
        let class =
            ObjectClass::from_name(class_name).ok_or_else(|| StorageError::unknown_class(class_name))?;
        let id = id.map(str::trim).filter(|s| !s.is_empty());
        let name = name.map(str::trim).filter(|s| !s.is_empty());

        if let Some(id) = id {
            if let Some(found) = self.inner.get_object_by_id(class, id).await? {
                if let Some(name) = name {
                    if found.name() != Some(name) {
                        warn!(
                            class = %class,
                            id,
                            expected_name = name,
                            actual_name = found.name().unwrap_or(""),
                            "Reference name does not match object found by id"
                        );
                    }
                }
                return Ok(Some(found));
            }
        }

        if let Some(name) = name {
            if let Some(found) = self.inner.get_object_by_name(class, name).await? {
                if let Some(id) = id {
                    warn!(
                        class = %class,
                        name,
                        expected_id = id,
                        actual_id = found.id().unwrap_or(""),
                        "Reference id not found; resolved by name instead"
                    );
                }
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// Resolves a typed [`Reference`].
    ///
    /// ## Errors
    ///
    /// Returns whatever the inner resolver reports.
    pub async fn resolve_reference(&self, reference: &Reference) -> StorageResult<Option<AnyObject>> {
        self.resolve(reference.class.as_str(), reference.id(), reference.name())
            .await
    }

    /// Resolves a reference that must exist.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound`/`NotFoundByName` when nothing matches.
    pub async fn require(&self, reference: &Reference) -> StorageResult<AnyObject> {
        match self.resolve_reference(reference).await? {
            Some(found) => Ok(found),
            None => Err(match reference.id() {
                Some(id) => StorageError::not_found(reference.class, id),
                None => StorageError::not_found_by_name(
                    reference.class,
                    reference.name().unwrap_or_default(),
                ),
            }),
        }
    }
}
