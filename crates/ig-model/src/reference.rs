//! References between objects.
//!
//! Objects never own each other. A field that points at another object
//! stores a [`Reference`]: the target's class plus whichever of id and name
//! is known. Turning a reference back into an object is the resolver's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::class::ObjectClass;
use crate::object::PersistentObject;

/// A pointer to another persistent object by id and/or name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Class of the target.
    pub class: ObjectClass,
    /// Target id, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Target name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    /// Creates a reference from explicit parts.
    ///
    /// Blank ids and names are treated as absent.
    #[must_use]
    pub fn new(class: ObjectClass, id: Option<String>, name: Option<String>) -> Self {
        Self {
            class,
            id: id.filter(|s| !s.trim().is_empty()),
            name: name.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Creates a reference that only knows the target id.
    #[must_use]
    pub fn by_id(class: ObjectClass, id: impl Into<String>) -> Self {
        Self::new(class, Some(id.into()), None)
    }

    /// Creates a reference that only knows the target name.
    #[must_use]
    pub fn by_name(class: ObjectClass, name: impl Into<String>) -> Self {
        Self::new(class, None, Some(name.into()))
    }

    /// Creates a reference to an object.
    #[must_use]
    pub fn to(object: &dyn PersistentObject) -> Self {
        Self::new(
            object.object_class(),
            object.id().map(ToString::to_string),
            object.name().map(ToString::to_string),
        )
    }

    /// Returns the id, if set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns whether this reference points at the same target as
    /// another, comparing ids when both have one and names otherwise.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        if self.class != other.class {
            return false;
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => matches!((self.name(), other.name()), (Some(a), Some(b)) if a == b),
        }
    }

    /// Returns whether this reference points at the given object.
    #[must_use]
    pub fn refers_to(&self, object: &dyn PersistentObject) -> bool {
        self.same_target(&Self::to(object))
    }

    /// Returns the name if known, otherwise the id, otherwise an empty
    /// string.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name().or_else(|| self.id()).unwrap_or_default()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.display_name())
    }
}

/// Removes every reference to `target` from a list, returning whether
/// anything was removed.
pub fn remove_reference(list: &mut Vec<Reference>, target: &Reference) -> bool {
    let before = list.len();
    list.retain(|r| !r.same_target(target));
    list.len() != before
}

/// Collects the display names of a reference list.
#[must_use]
pub fn reference_names(list: &[Reference]) -> Vec<String> {
    list.iter().map(|r| r.display_name().to_string()).collect()
}
