//! The persistent-object header and the traits every entity implements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::any::AnyObject;
use crate::attributes::{AttrValue, Attributes};
use crate::class::ObjectClass;
use crate::error::ModelError;
use crate::reference::Reference;
use crate::scope::Scope;

/// Fields shared by every persistent object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectHeader {
    // === Identity ===
    /// Store-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Object name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Reference>,

    // === Timestamps ===
    /// When the object was first saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// When the object was last saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    // === Scoping ===
    /// Scope the object is assigned to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_scope: Option<Reference>,
    /// Path of the assigned scope, copied for searching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_scope_path: Option<String>,

    // === Flags ===
    /// Object is disabled.
    pub disabled: bool,
    /// Object may not be modified.
    pub immutable: bool,

    // === Locking ===
    /// Opaque lock string held by whoever is editing the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<String>,
    /// Workflow waiting on changes to this object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_workflow: Option<Reference>,
}

impl ObjectHeader {
    /// Creates a header with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let mut header = Self::default();
        header.set_name(Some(name.into()));
        header
    }

    /// Sets the id. Empty strings are stored as `None`.
    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id.filter(|s| !s.is_empty());
    }

    /// Sets the name, trimming surrounding whitespace. Empty names are
    /// stored as `None`.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }

    /// Assigns the object to a scope and copies the scope's path.
    pub fn set_assigned_scope(&mut self, scope: Option<&Scope>) {
        match scope {
            Some(scope) => {
                self.assigned_scope = Some(Reference::to(scope));
                let path = scope.path.clone();
                if self.assigned_scope_path != path {
                    self.assigned_scope_path = path;
                }
            }
            None => {
                self.assigned_scope = None;
                self.assigned_scope_path = None;
            }
        }
    }

    /// Forgets everything that ties this copy to a stored row, keeping
    /// the name.
    pub fn clear_persistent_identity(&mut self) {
        self.id = None;
        self.created = None;
        self.modified = None;
        self.lock = None;
        self.pending_workflow = None;
    }

    /// Returns whether the object has been saved.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    /// Returns whether a lock is held.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}

/// Behaviour shared by every persistent object.
///
/// The flag methods (`has_name`, `is_name_unique`, `has_assigned_scope`,
/// `unique_key_properties`) describe the object to the store; the record
/// itself does not enforce them.
pub trait PersistentObject: std::fmt::Debug + Send + Sync {
    /// Returns the object class.
    fn object_class(&self) -> ObjectClass;

    /// Returns the common header.
    fn header(&self) -> &ObjectHeader;

    /// Returns the common header mutably.
    fn header_mut(&mut self) -> &mut ObjectHeader;

    /// Returns the id.
    fn id(&self) -> Option<&str> {
        self.header().id.as_deref()
    }

    /// Returns the name.
    fn name(&self) -> Option<&str> {
        self.header().name.as_deref()
    }

    /// Whether objects of this kind are named at all.
    fn has_name(&self) -> bool {
        true
    }

    /// Whether names must be unique within the class.
    fn is_name_unique(&self) -> bool {
        self.has_name()
    }

    /// Whether the object can be assigned to a scope.
    fn has_assigned_scope(&self) -> bool {
        true
    }

    /// Properties that together identify the object when the name does not.
    fn unique_key_properties(&self) -> &'static [&'static str] {
        &[]
    }

    /// Value of the unique key, joined from `unique_key_properties`.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Class name written to audit records.
    fn audit_class_name(&self) -> &'static str {
        self.object_class().as_str()
    }

    /// Returns a reference to this object.
    fn reference(&self) -> Reference {
        Reference::new(
            self.object_class(),
            self.id().map(ToString::to_string),
            self.name().map(ToString::to_string),
        )
    }

    /// Persistence identity: same class, and equal ids when both have
    /// one, otherwise equal names when names are unique.
    fn identity_eq(&self, other: &dyn PersistentObject) -> bool {
        if self.object_class() != other.object_class() {
            return false;
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => {
                self.is_name_unique()
                    && matches!((self.name(), other.name()), (Some(a), Some(b)) if a == b)
            }
        }
    }

    /// The extensible attribute bag, for objects that have one.
    fn attributes(&self) -> Option<&Attributes> {
        None
    }

    /// The extensible attribute bag, mutably.
    fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        None
    }

    /// Looks up an extended attribute.
    fn extended_attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes().and_then(|attrs| attrs.get(key))
    }
}

/// A concrete entity type that can be stored in an [`AnyObject`].
pub trait Entity:
    PersistentObject + Clone + Into<AnyObject> + TryFrom<AnyObject, Error = ModelError>
{
    /// The class of this entity.
    const CLASS: ObjectClass;

    /// Copies this object as a template for a new one: the copy has no
    /// id, timestamps, lock or name.
    #[must_use]
    fn derive(&self) -> Self {
        let mut copy = self.clone();
        let header = copy.header_mut();
        header.clear_persistent_identity();
        header.name = None;
        copy
    }
}

/// Implements [`PersistentObject`] and [`Entity`] for a struct with a
/// `header` field whose type name matches its [`ObjectClass`] variant.
/// Extra trait items can be supplied in braces.
macro_rules! persistent_object {
    ($ty:ident) => {
        persistent_object!($ty {});
    };
    ($ty:ident { $($item:tt)* }) => {
        impl $crate::object::PersistentObject for $ty {
            fn object_class(&self) -> $crate::class::ObjectClass {
                $crate::class::ObjectClass::$ty
            }

            fn header(&self) -> &$crate::object::ObjectHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut $crate::object::ObjectHeader {
                &mut self.header
            }

            $($item)*
        }

        impl $crate::object::Entity for $ty {
            const CLASS: $crate::class::ObjectClass = $crate::class::ObjectClass::$ty;
        }
    };
}

pub(crate) use persistent_object;

/// Implements the attribute-bag accessors for a struct with an
/// `attributes: Attributes` field. Used inside [`persistent_object!`].
macro_rules! with_attributes {
    () => {
        fn attributes(&self) -> Option<&$crate::attributes::Attributes> {
            Some(&self.attributes)
        }

        fn attributes_mut(&mut self) -> Option<&mut $crate::attributes::Attributes> {
            Some(&mut self.attributes)
        }
    };
}

pub(crate) use with_attributes;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::link::Link;

    #[test]
    fn name_is_trimmed_and_empty_is_none() {
        let mut header = ObjectHeader::default();
        header.set_name(Some("  Alan.Bradley \t".into()));
        assert_eq!(header.name.as_deref(), Some("Alan.Bradley"));

        header.set_name(Some("   ".into()));
        assert!(header.name.is_none());

        header.set_name(None);
        assert!(header.name.is_none());
    }

    #[test]
    fn empty_id_is_none() {
        let mut header = ObjectHeader::default();
        header.set_id(Some(String::new()));
        assert!(header.id.is_none());
        assert!(!header.is_persisted());

        header.set_id(Some("4028".into()));
        assert!(header.is_persisted());
    }

    #[test]
    fn clear_persistent_identity_keeps_name() {
        let mut header = ObjectHeader::named("Finance");
        header.id = Some("1".into());
        header.created = Some(Utc::now());
        header.modified = Some(Utc::now());
        header.lock = Some("spadmin".into());

        header.clear_persistent_identity();

        assert_eq!(header.name.as_deref(), Some("Finance"));
        assert!(header.id.is_none());
        assert!(header.created.is_none());
        assert!(header.modified.is_none());
        assert!(!header.is_locked());
    }

    #[test]
    fn assigned_scope_copies_path() {
        let mut scope = Scope::new("Austin");
        scope.header.id = Some("s1".into());
        scope.path = Some("Americas:Texas:Austin".into());

        let mut header = ObjectHeader::default();
        header.set_assigned_scope(Some(&scope));
        assert_eq!(header.assigned_scope_path.as_deref(), Some("Americas:Texas:Austin"));
        assert_eq!(header.assigned_scope.as_ref().and_then(|r| r.id()), Some("s1"));

        header.set_assigned_scope(None);
        assert!(header.assigned_scope.is_none());
        assert!(header.assigned_scope_path.is_none());
    }

    #[test]
    fn identity_eq_prefers_ids() {
        let mut a = Identity::new("jsmith");
        let mut b = Identity::new("jsmith");
        assert!(a.identity_eq(&b));

        a.header.id = Some("1".into());
        b.header.id = Some("2".into());
        assert!(!a.identity_eq(&b));

        b.header.id = Some("1".into());
        b.header.name = Some("other".into());
        assert!(a.identity_eq(&b));
    }

    #[test]
    fn identity_eq_ignores_names_when_not_unique() {
        let a = Link::new("jsmith");
        let b = Link::new("jsmith");
        assert!(!a.identity_eq(&b));
    }

    #[test]
    fn identity_eq_requires_same_class() {
        let identity = Identity::new("x");
        let link = Link::new("x");
        assert!(!identity.identity_eq(&link));
    }

    #[test]
    fn derive_clears_identity_and_name() {
        let mut template = Identity::new("template");
        template.header.id = Some("1".into());
        template.firstname = Some("Pat".into());

        let copy = template.derive();
        assert!(copy.header.id.is_none());
        assert!(copy.header.name.is_none());
        assert_eq!(copy.firstname.as_deref(), Some("Pat"));
    }
}
