//! Managed attribute (entitlement catalogue) domain model.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::object::{persistent_object, with_attributes, ObjectHeader};
use crate::reference::Reference;

/// Properties forming a managed attribute's unique key.
pub const MANAGED_ATTRIBUTE_UNIQUE_KEY: &[&str] = &["application", "attribute", "value"];

/// Kind of catalogue entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ManagedAttributeType {
    /// A value of an entitlement attribute.
    #[default]
    Entitlement,
    /// A permission on a target.
    Permission,
}

impl ManagedAttributeType {
    /// Returns the type name as written in XML.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entitlement => "Entitlement",
            Self::Permission => "Permission",
        }
    }

    /// Parses a type name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("entitlement") {
            Some(Self::Entitlement)
        } else if s.eq_ignore_ascii_case("permission") {
            Some(Self::Permission)
        } else {
            None
        }
    }
}

/// An entitlement catalogue entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagedAttribute {
    /// Common object fields.
    pub header: ObjectHeader,

    /// Application the entitlement lives on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Reference>,
    /// Entry kind.
    pub attr_type: ManagedAttributeType,
    /// Account attribute name (e.g. "memberOf").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Attribute value (e.g. a group DN).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Friendly name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// May be requested through self-service.
    pub requestable: bool,

    /// Extended attributes.
    pub attributes: Attributes,
}

persistent_object!(ManagedAttribute {
    with_attributes!();

    fn is_name_unique(&self) -> bool {
        false
    }

    fn unique_key_properties(&self) -> &'static [&'static str] {
        MANAGED_ATTRIBUTE_UNIQUE_KEY
    }

    fn unique_key(&self) -> Option<String> {
        let application = self.application.as_ref()?.display_name().to_string();
        Some(format!(
            "{application}|{}|{}",
            self.attribute.as_deref().unwrap_or_default(),
            self.value.as_deref().unwrap_or_default()
        ))
    }
});

impl ManagedAttribute {
    /// Creates an entitlement entry for `attribute=value` on an application.
    #[must_use]
    pub fn new(application: Reference, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            application: Some(application),
            attribute: Some(attribute.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Returns the display name, falling back to the value.
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.value.as_deref())
    }

    /// Whether this entry is on the given application.
    #[must_use]
    pub fn is_on(&self, application: &Reference) -> bool {
        self.application
            .as_ref()
            .is_some_and(|a| a.same_target(application))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ObjectClass;
    use crate::object::PersistentObject;

    #[test]
    fn names_are_not_unique() {
        let app = Reference::by_name(ObjectClass::Application, "AD");
        let ma = ManagedAttribute::new(app, "memberOf", "CN=Admins");
        assert!(ma.has_name());
        assert!(!ma.is_name_unique());
        assert_eq!(ma.unique_key().as_deref(), Some("AD|memberOf|CN=Admins"));
    }

    #[test]
    fn display_label_falls_back_to_value() {
        let app = Reference::by_name(ObjectClass::Application, "AD");
        let mut ma = ManagedAttribute::new(app, "memberOf", "CN=Admins");
        assert_eq!(ma.display_label(), Some("CN=Admins"));
        ma.display_name = Some("Domain Admins".into());
        assert_eq!(ma.display_label(), Some("Domain Admins"));
    }

    #[test]
    fn type_parsing() {
        assert_eq!(
            ManagedAttributeType::parse("permission"),
            Some(ManagedAttributeType::Permission)
        );
        assert_eq!(ManagedAttributeType::parse("group"), None);
        assert_eq!(ManagedAttributeType::default().as_str(), "Entitlement");
    }
}
