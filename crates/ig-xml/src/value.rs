//! Field-level XML mapping: dates, enums, references, string lists and
//! attribute maps.
//!
//! [`ElementWriter`] builds an object element field by field; the reading
//! helpers on [`Element`] undo each write.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ig_model::application::Feature;
use ig_model::certification::{CertificationPhase, CertificationType};
use ig_model::policy::{PolicyState, ViolationStatus};
use ig_model::task::{CompletionStatus, MessageLevel};
use ig_model::work_item::{WorkItemLevel, WorkItemState, WorkItemType};
use ig_model::{AttrValue, Attributes, ManagedAttributeType, ModelError, ObjectClass, ObjectHeader, Reference};

use crate::codec::XmlOptions;
use crate::dom::Element;
use crate::error::{XmlError, XmlResult};

// ============================================================================
// Scalars
// ============================================================================

/// Formats a timestamp as epoch milliseconds.
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.timestamp_millis().to_string()
}

/// Parses epoch milliseconds.
///
/// ## Errors
///
/// Returns `XmlError::InvalidValue` naming `field` if the text is not a
/// millisecond timestamp.
pub fn parse_date(field: &str, text: &str) -> XmlResult<DateTime<Utc>> {
    text.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| XmlError::invalid_value(field, text))
}

/// An enum written by name.
pub trait XmlEnum: Copy + Sized {
    /// Name written to XML.
    fn xml_name(self) -> &'static str;
    /// Parses a name read from XML.
    fn from_xml_name(name: &str) -> Option<Self>;
}

macro_rules! xml_enums {
    ($($ty:ty),* $(,)?) => {
        $(
            impl XmlEnum for $ty {
                fn xml_name(self) -> &'static str {
                    self.as_str()
                }

                fn from_xml_name(name: &str) -> Option<Self> {
                    Self::parse(name)
                }
            }
        )*
    };
}

xml_enums!(
    WorkItemType,
    WorkItemState,
    WorkItemLevel,
    CertificationType,
    CertificationPhase,
    PolicyState,
    ViolationStatus,
    CompletionStatus,
    MessageLevel,
    ManagedAttributeType,
);

impl XmlEnum for Feature {
    fn xml_name(self) -> &'static str {
        self.as_str()
    }

    fn from_xml_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

// ============================================================================
// References
// ============================================================================

/// Encodes a `<Reference>` element.
#[must_use]
pub fn encode_reference(reference: &Reference, options: &XmlOptions) -> Element {
    let class = if options.qualified_class_names {
        reference.class.qualified_name()
    } else {
        reference.class.as_str().to_string()
    };
    let mut element = Element::new("Reference").with_attr("class", class);
    if let Some(id) = reference.id() {
        element.set_attr("id", id);
    }
    if let Some(name) = reference.name() {
        element.set_attr("name", name);
    }
    element
}

/// Decodes a `<Reference>` element.
///
/// ## Errors
///
/// Returns an error if the element is not a reference or names an unknown
/// class.
pub fn decode_reference(element: &Element) -> XmlResult<Reference> {
    element.expect_name("Reference")?;
    let class_name = element.attr("class").ok_or_else(|| XmlError::MissingAttribute {
        element: element.name.clone(),
        attribute: "class",
    })?;
    let class = ObjectClass::from_name(class_name)
        .ok_or_else(|| ModelError::UnknownClass(class_name.to_string()))?;
    Ok(Reference::new(
        class,
        element.attr("id").map(ToString::to_string),
        element.attr("name").map(ToString::to_string),
    ))
}

// ============================================================================
// Attribute values
// ============================================================================

/// Encodes a value as a typed element (`<String>`, `<Integer>`, `<Map>`...).
#[must_use]
pub fn encode_value(value: &AttrValue, options: &XmlOptions) -> Element {
    match value {
        AttrValue::String(s) => Element::new("String").with_text(s.as_str()),
        AttrValue::Bool(b) => Element::new("Boolean").with_text(b.to_string()),
        AttrValue::Int(i) => Element::new("Integer").with_text(i.to_string()),
        AttrValue::Long(l) => Element::new("Long").with_text(l.to_string()),
        AttrValue::Float(f) => Element::new("Double").with_text(f.to_string()),
        AttrValue::Date(d) => Element::new("Date").with_text(format_date(*d)),
        AttrValue::List(items) => {
            let mut list = Element::new("List");
            list.children = items.iter().map(|v| encode_value(v, options)).collect();
            list
        }
        AttrValue::Map(map) => encode_map(map.iter(), options),
        AttrValue::Reference(r) => encode_reference(r, options),
    }
}

/// Decodes a typed value element.
///
/// ## Errors
///
/// Returns an error for unknown element names or unparseable scalars.
pub fn decode_value(element: &Element) -> XmlResult<AttrValue> {
    let text = element.text().unwrap_or_default();
    let value = match element.name.as_str() {
        "String" => AttrValue::String(text.to_string()),
        "Boolean" => AttrValue::Bool(text.trim().eq_ignore_ascii_case("true")),
        "Integer" => AttrValue::Int(parse_scalar("Integer", text)?),
        "Long" => AttrValue::Long(parse_scalar("Long", text)?),
        "Double" | "Float" => AttrValue::Float(parse_scalar("Double", text)?),
        "Date" => AttrValue::Date(parse_date("Date", text)?),
        "List" | "Set" => AttrValue::List(
            element
                .children
                .iter()
                .map(decode_value)
                .collect::<XmlResult<_>>()?,
        ),
        "Map" => AttrValue::Map(decode_map(element)?),
        "Reference" => AttrValue::Reference(decode_reference(element)?),
        other => return Err(XmlError::invalid_value("value", format!("<{other}>"))),
    };
    Ok(value)
}

fn parse_scalar<T: FromStr>(field: &str, text: &str) -> XmlResult<T> {
    text.trim()
        .parse()
        .map_err(|_| XmlError::invalid_value(field, text))
}

/// Encodes `<Map>` with one `<entry>` per key. Plain strings are written
/// inline as a `value` attribute, everything else nested in `<value>`.
pub fn encode_map<'a>(
    entries: impl Iterator<Item = (&'a String, &'a AttrValue)>,
    options: &XmlOptions,
) -> Element {
    let mut map = Element::new("Map");
    for (key, value) in entries {
        let mut entry = Element::new("entry").with_attr("key", key.as_str());
        match value {
            AttrValue::String(s) => entry.set_attr("value", s.as_str()),
            other => entry
                .children
                .push(Element::new("value").with_child(encode_value(other, options))),
        }
        map.children.push(entry);
    }
    map
}

/// Decodes a `<Map>` element. Entries without a value are skipped.
///
/// ## Errors
///
/// Returns an error if an entry has no key or holds a bad value.
pub fn decode_map(element: &Element) -> XmlResult<BTreeMap<String, AttrValue>> {
    element.expect_name("Map")?;
    let mut map = BTreeMap::new();
    for entry in element.children_named("entry") {
        let key = entry.attr("key").ok_or_else(|| XmlError::MissingAttribute {
            element: "entry".to_string(),
            attribute: "key",
        })?;
        let value = match entry.attr("value") {
            Some(inline) => Some(AttrValue::String(inline.to_string())),
            None => entry
                .child("value")
                .and_then(|v| v.children.first())
                .map(decode_value)
                .transpose()?,
        };
        if let Some(value) = value {
            map.insert(key.to_string(), value);
        }
    }
    Ok(map)
}

// ============================================================================
// Writing
// ============================================================================

/// Builds an object element one field at a time.
///
/// Absent options, `false` flags, zero counters and empty lists are left
/// out, matching what the readers assume when a field is missing.
#[derive(Debug)]
pub struct ElementWriter<'a> {
    element: Element,
    options: &'a XmlOptions,
}

impl<'a> ElementWriter<'a> {
    /// Starts an element.
    #[must_use]
    pub fn new(name: impl Into<String>, options: &'a XmlOptions) -> Self {
        Self {
            element: Element::new(name),
            options,
        }
    }

    /// Returns the writer options.
    #[must_use]
    pub const fn options(&self) -> &XmlOptions {
        self.options
    }

    /// Writes an optional string attribute.
    pub fn attr(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.element.set_attr(key, value);
        }
        self
    }

    /// Writes a boolean attribute when it is set.
    pub fn flag(&mut self, key: &str, value: bool) -> &mut Self {
        if value {
            self.element.set_attr(key, "true");
        }
        self
    }

    /// Writes a numeric attribute unless it is zero.
    pub fn number<N: Display + Default + PartialEq>(&mut self, key: &str, value: N) -> &mut Self {
        if value != N::default() {
            self.element.set_attr(key, value.to_string());
        }
        self
    }

    /// Writes a timestamp attribute.
    pub fn date(&mut self, key: &str, value: Option<DateTime<Utc>>) -> &mut Self {
        if let Some(value) = value {
            self.element.set_attr(key, format_date(value));
        }
        self
    }

    /// Writes an enum attribute.
    pub fn enumeration<E: XmlEnum>(&mut self, key: &str, value: Option<E>) -> &mut Self {
        if let Some(value) = value {
            self.element.set_attr(key, value.xml_name());
        }
        self
    }

    /// Writes a child element holding text.
    pub fn text(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.element.children.push(Element::new(name).with_text(value));
        }
        self
    }

    /// Writes a reference wrapped in a named element.
    pub fn reference(&mut self, wrapper: &str, value: Option<&Reference>) -> &mut Self {
        if let Some(value) = value {
            let reference = encode_reference(value, self.options);
            self.element.children.push(Element::new(wrapper).with_child(reference));
        }
        self
    }

    /// Writes a list of references wrapped in a named element.
    pub fn references(&mut self, wrapper: &str, values: &[Reference]) -> &mut Self {
        if !values.is_empty() {
            let mut list = Element::new(wrapper);
            list.children = values.iter().map(|r| encode_reference(r, self.options)).collect();
            self.element.children.push(list);
        }
        self
    }

    /// Writes a list of strings as `<wrapper><List><String>..`.
    pub fn strings(&mut self, wrapper: &str, values: &[String]) -> &mut Self {
        if !values.is_empty() {
            let mut list = Element::new("List");
            list.children = values
                .iter()
                .map(|s| Element::new("String").with_text(s.as_str()))
                .collect();
            self.element.children.push(Element::new(wrapper).with_child(list));
        }
        self
    }

    /// Writes an attribute bag as `<wrapper><Map>..`.
    pub fn attributes(&mut self, wrapper: &str, values: &Attributes) -> &mut Self {
        if !values.is_empty() {
            let map = encode_map(values.iter(), self.options);
            self.element.children.push(Element::new(wrapper).with_child(map));
        }
        self
    }

    /// Appends a prepared child element.
    pub fn child(&mut self, child: Element) -> &mut Self {
        self.element.children.push(child);
        self
    }

    /// Writes the common header fields.
    pub fn header(&mut self, header: &ObjectHeader) -> &mut Self {
        self.attr("id", header.id.as_deref())
            .attr("name", header.name.as_deref())
            .date("created", header.created)
            .date("modified", header.modified)
            .flag("disabled", header.disabled)
            .flag("immutable", header.immutable)
            .attr("lock", header.lock.as_deref())
            .attr("assignedScopePath", header.assigned_scope_path.as_deref())
            .text("Description", header.description.as_deref())
            .reference("Owner", header.owner.as_ref())
            .reference("AssignedScope", header.assigned_scope.as_ref())
            .reference("PendingWorkflow", header.pending_workflow.as_ref())
    }

    /// Finishes the element.
    #[must_use]
    pub fn finish(self) -> Element {
        self.element
    }
}

// ============================================================================
// Reading
// ============================================================================

impl Element {
    /// Reads a string attribute. Empty values read as `None`.
    #[must_use]
    pub fn string_attr(&self, key: &str) -> Option<String> {
        self.attr(key).filter(|v| !v.is_empty()).map(ToString::to_string)
    }

    /// Reads a boolean attribute; anything but `true` is false.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.attr(key).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Reads a numeric attribute, zero when absent.
    ///
    /// ## Errors
    ///
    /// Returns `XmlError::InvalidValue` if the attribute is not a number.
    pub fn number<N: FromStr + Default>(&self, key: &str) -> XmlResult<N> {
        self.attr(key)
            .map_or_else(|| Ok(N::default()), |v| parse_scalar(key, v))
    }

    /// Reads a timestamp attribute.
    ///
    /// ## Errors
    ///
    /// Returns `XmlError::InvalidValue` if the attribute is not a
    /// millisecond timestamp.
    pub fn date_attr(&self, key: &str) -> XmlResult<Option<DateTime<Utc>>> {
        self.attr(key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_date(key, v))
            .transpose()
    }

    /// Reads an enum attribute.
    ///
    /// ## Errors
    ///
    /// Returns `XmlError::InvalidValue` for unknown names.
    pub fn enum_attr<E: XmlEnum>(&self, key: &str) -> XmlResult<Option<E>> {
        self.attr(key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| E::from_xml_name(v).ok_or_else(|| XmlError::invalid_value(key, v)))
            .transpose()
    }

    /// Reads the text of a named child.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(Element::text).map(ToString::to_string)
    }

    /// Reads the reference inside a named child.
    ///
    /// ## Errors
    ///
    /// Returns an error if the wrapped element is not a valid reference.
    pub fn reference_in(&self, wrapper: &str) -> XmlResult<Option<Reference>> {
        self.child(wrapper)
            .and_then(|w| w.children.first())
            .map(decode_reference)
            .transpose()
    }

    /// Reads the references inside a named child.
    ///
    /// ## Errors
    ///
    /// Returns an error if any wrapped element is not a valid reference.
    pub fn references_in(&self, wrapper: &str) -> XmlResult<Vec<Reference>> {
        self.child(wrapper)
            .map(|w| w.children.iter().map(decode_reference).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Reads the strings inside `<wrapper><List>`.
    #[must_use]
    pub fn strings_in(&self, wrapper: &str) -> Vec<String> {
        self.child(wrapper)
            .and_then(|w| w.child("List"))
            .map(|list| {
                list.children
                    .iter()
                    .map(|s| s.text().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reads the attribute bag inside `<wrapper><Map>`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the map holds bad values.
    pub fn attributes_in(&self, wrapper: &str) -> XmlResult<Attributes> {
        let mut attributes = Attributes::new();
        if let Some(map) = self.child(wrapper).and_then(|w| w.child("Map")) {
            for (key, value) in decode_map(map)? {
                attributes.put(key, value);
            }
        }
        Ok(attributes)
    }

    /// Reads the common header fields.
    ///
    /// ## Errors
    ///
    /// Returns an error if a timestamp or reference is malformed.
    pub fn header(&self) -> XmlResult<ObjectHeader> {
        let mut header = ObjectHeader::default();
        header.set_id(self.string_attr("id"));
        header.set_name(self.string_attr("name"));
        header.description = self.child_text("Description");
        header.owner = self.reference_in("Owner")?;
        header.created = self.date_attr("created")?;
        header.modified = self.date_attr("modified")?;
        header.assigned_scope = self.reference_in("AssignedScope")?;
        header.assigned_scope_path = self.string_attr("assignedScopePath");
        header.disabled = self.flag("disabled");
        header.immutable = self.flag("immutable");
        header.lock = self.string_attr("lock");
        header.pending_workflow = self.reference_in("PendingWorkflow")?;
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> XmlOptions {
        XmlOptions::default()
    }

    #[test]
    fn dates_are_epoch_millis() {
        let date = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(format_date(date), "1700000000123");
        assert_eq!(parse_date("created", "1700000000123").unwrap(), date);
        assert!(matches!(
            parse_date("created", "yesterday"),
            Err(XmlError::InvalidValue { field, .. }) if field == "created"
        ));
    }

    #[test]
    fn references_use_qualified_class_names() {
        let reference = Reference::by_name(ObjectClass::Identity, "alice");
        let element = encode_reference(&reference, &options());
        assert_eq!(element.attr("class"), Some("sailpoint.object.Identity"));

        let simple = XmlOptions {
            qualified_class_names: false,
            ..options()
        };
        assert_eq!(encode_reference(&reference, &simple).attr("class"), Some("Identity"));
        assert_eq!(decode_reference(&element).unwrap(), reference);
    }

    #[test]
    fn unknown_reference_class_is_rejected() {
        let element = Element::new("Reference").with_attr("class", "sailpoint.object.Widget");
        assert!(matches!(
            decode_reference(&element),
            Err(XmlError::Model(ModelError::UnknownClass(_)))
        ));
    }

    #[test]
    fn map_entries_inline_strings_and_nest_the_rest() {
        let mut attrs = Attributes::new();
        attrs.put("department", "Finance");
        attrs.put("groups", vec!["a".to_string(), "b".to_string()]);
        attrs.put("active", true);
        attrs.put("level", 3);

        let map = encode_map(attrs.iter(), &options());
        let department = map.children.iter().find(|e| e.attr("key") == Some("department")).unwrap();
        assert_eq!(department.attr("value"), Some("Finance"));
        let groups = map.children.iter().find(|e| e.attr("key") == Some("groups")).unwrap();
        assert_eq!(groups.child("value").unwrap().children[0].name, "List");

        let decoded = decode_map(&map).unwrap();
        assert_eq!(decoded.get("active"), Some(&AttrValue::Bool(true)));
        assert_eq!(decoded.get("level"), Some(&AttrValue::Int(3)));
        assert_eq!(decoded.len(), 4);
    }

    #[test]
    fn header_round_trip() {
        let mut header = ObjectHeader::named("Finance Admins");
        header.id = Some("abc".to_string());
        header.description = Some("People who approve".to_string());
        header.owner = Some(Reference::by_name(ObjectClass::Identity, "bob"));
        header.disabled = true;
        header.created = DateTime::from_timestamp_millis(1_600_000_000_000);

        let opts = options();
        let mut writer = ElementWriter::new("Bundle", &opts);
        writer.header(&header);
        let element = writer.finish();
        assert_eq!(element.attr("disabled"), Some("true"));
        assert!(element.attr("immutable").is_none());
        assert_eq!(element.header().unwrap(), header);
    }

    #[test]
    fn readers_default_missing_fields() {
        let element = Element::new("WorkItem").with_attr("escalationCount", "x");
        assert!(!element.flag("inactive"));
        assert_eq!(element.number::<u32>("reassignmentCount").unwrap(), 0);
        assert!(element.number::<u32>("escalationCount").is_err());
        assert!(element.references_in("Links").unwrap().is_empty());
        assert!(element.strings_in("Capabilities").is_empty());
        assert!(element.enum_attr::<WorkItemState>("state").unwrap().is_none());
    }
}
