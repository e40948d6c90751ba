//! Scope domain model.
//!
//! Scopes partition objects for delegated administration. They form a
//! tree; each scope stores the colon-separated path of names from the root
//! so objects assigned to it can be filtered without walking parents.

use serde::{Deserialize, Serialize};

use crate::object::{persistent_object, ObjectHeader};
use crate::reference::Reference;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = ':';

/// An authorization scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    /// Common object fields.
    pub header: ObjectHeader,
    /// Display name shown instead of the (possibly generated) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Parent scope (None for top-level scopes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Reference>,
    /// Denormalized path from the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Scope is not fully populated yet and must not be used for
    /// authorization.
    pub dormant: bool,
}

persistent_object!(Scope);

impl Scope {
    /// Creates a top-level scope.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let header = ObjectHeader::named(name);
        let path = header.name.clone();
        Self {
            header,
            path,
            ..Self::default()
        }
    }

    /// Creates a child of `parent`, extending its path.
    #[must_use]
    pub fn new_child(parent: &Self, name: impl Into<String>) -> Self {
        let mut scope = Self::new(name);
        scope.set_parent(Some(parent));
        scope
    }

    /// Re-parents the scope and recomputes its path.
    pub fn set_parent(&mut self, parent: Option<&Self>) {
        self.parent = parent.map(|p| Reference::to(p));
        let leaf = self.header.name.clone().unwrap_or_default();
        let mut path = parent
            .and_then(|p| p.path.as_deref())
            .map(ScopePath::parse)
            .unwrap_or_default();
        path.segments.push(leaf);
        self.path = Some(path.to_path_string());
    }

    /// Checks if this is a top-level scope.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns whether `other` is this scope or one of its descendants.
    #[must_use]
    pub fn contains_path(&self, other: &str) -> bool {
        match self.path.as_deref() {
            Some(path) => {
                other == path
                    || other
                        .strip_prefix(path)
                        .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
            }
            None => false,
        }
    }

    /// Returns the display name, falling back to the name.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.header.name.as_deref())
            .unwrap_or_default()
    }
}

/// A parsed scope path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopePath {
    /// Path segments from root to leaf.
    pub segments: Vec<String>,
}

impl ScopePath {
    /// Parses a path string (e.g. `"Americas:Texas:Austin"`).
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split(PATH_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self { segments }
    }

    /// Returns the path as a string.
    #[must_use]
    pub fn to_path_string(&self) -> String {
        self.segments.join(&PATH_SEPARATOR.to_string())
    }

    /// Returns the parent path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the leaf (last segment).
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the depth (number of segments).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_scope() {
        let scope = Scope::new("Americas");
        assert!(scope.is_top_level());
        assert_eq!(scope.path.as_deref(), Some("Americas"));
        assert_eq!(scope.display_label(), "Americas");
    }

    #[test]
    fn child_extends_parent_path() {
        let americas = Scope::new("Americas");
        let texas = Scope::new_child(&americas, "Texas");
        let austin = Scope::new_child(&texas, "Austin");

        assert_eq!(austin.path.as_deref(), Some("Americas:Texas:Austin"));
        assert_eq!(austin.parent.as_ref().and_then(|r| r.name()), Some("Texas"));
        assert!(americas.contains_path("Americas:Texas:Austin"));
        assert!(texas.contains_path("Americas:Texas"));
        assert!(!texas.contains_path("Americas:Texarkana"));
    }

    #[test]
    fn path_parsing() {
        let path = ScopePath::parse("Americas: Texas :Austin");

        assert_eq!(path.segments, vec!["Americas", "Texas", "Austin"]);
        assert_eq!(path.to_path_string(), "Americas:Texas:Austin");
        assert_eq!(path.leaf(), Some("Austin"));
        assert_eq!(path.depth(), 3);
        assert_eq!(path.parent().unwrap().to_path_string(), "Americas:Texas");
        assert!(ScopePath::parse("Root").parent().is_none());
    }
}
