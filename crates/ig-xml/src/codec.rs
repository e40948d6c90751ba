//! Object-level codec: [`AnyObject`] to XML and back.

use ig_core::config::XmlConfig;
use ig_model::{AnyObject, ObjectClass};
use tracing::debug;

use crate::dom::Element;
use crate::entity::{decode_entity, encode_entity};
use crate::error::{XmlError, XmlResult};

/// Name of the wrapper element holding several objects.
pub const WRAPPER_ELEMENT: &str = "sailpoint";

/// Writer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    /// Spaces per indentation level; zero writes one line.
    pub indent: usize,
    /// Write reference classes fully qualified.
    pub qualified_class_names: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self::from(&XmlConfig::default())
    }
}

impl From<&XmlConfig> for XmlOptions {
    fn from(config: &XmlConfig) -> Self {
        Self {
            indent: config.indent,
            qualified_class_names: config.qualified_class_names,
        }
    }
}

/// Converts objects to and from their XML form.
#[derive(Debug, Clone, Default)]
pub struct XmlCodec {
    options: XmlOptions,
}

impl XmlCodec {
    /// Creates a codec with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec from configuration.
    #[must_use]
    pub fn from_config(config: &XmlConfig) -> Self {
        Self {
            options: XmlOptions::from(config),
        }
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, options: XmlOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &XmlOptions {
        &self.options
    }

    /// Encodes an object as an element.
    #[must_use]
    pub fn encode(&self, object: &AnyObject) -> Element {
        let options = &self.options;
        match object {
            AnyObject::Identity(o) => encode_entity(o, options),
            AnyObject::Application(o) => encode_entity(o, options),
            AnyObject::Link(o) => encode_entity(o, options),
            AnyObject::Bundle(o) => encode_entity(o, options),
            AnyObject::ManagedAttribute(o) => encode_entity(o, options),
            AnyObject::WorkItem(o) => encode_entity(o, options),
            AnyObject::WorkItemArchive(o) => encode_entity(o, options),
            AnyObject::Certification(o) => encode_entity(o, options),
            AnyObject::Policy(o) => encode_entity(o, options),
            AnyObject::PolicyViolation(o) => encode_entity(o, options),
            AnyObject::Scope(o) => encode_entity(o, options),
            AnyObject::Server(o) => encode_entity(o, options),
            AnyObject::ServerStatistic(o) => encode_entity(o, options),
            AnyObject::Rule(o) => encode_entity(o, options),
            AnyObject::TaskDefinition(o) => encode_entity(o, options),
            AnyObject::TaskResult(o) => encode_entity(o, options),
        }
    }

    /// Decodes an object from its element. The element name selects the
    /// class.
    ///
    /// ## Errors
    ///
    /// Returns `XmlError::UnknownElement` if the name is not a class, or
    /// the field error for malformed content.
    pub fn decode(&self, element: &Element) -> XmlResult<AnyObject> {
        let class = ObjectClass::from_name(&element.name)
            .filter(|c| c.as_str() == element.name)
            .ok_or_else(|| XmlError::UnknownElement(element.name.clone()))?;
        let object = match class {
            ObjectClass::Identity => AnyObject::Identity(decode_entity(element)?),
            ObjectClass::Application => AnyObject::Application(decode_entity(element)?),
            ObjectClass::Link => AnyObject::Link(decode_entity(element)?),
            ObjectClass::Bundle => AnyObject::Bundle(decode_entity(element)?),
            ObjectClass::ManagedAttribute => AnyObject::ManagedAttribute(decode_entity(element)?),
            ObjectClass::WorkItem => AnyObject::WorkItem(decode_entity(element)?),
            ObjectClass::WorkItemArchive => AnyObject::WorkItemArchive(decode_entity(element)?),
            ObjectClass::Certification => AnyObject::Certification(decode_entity(element)?),
            ObjectClass::Policy => AnyObject::Policy(decode_entity(element)?),
            ObjectClass::PolicyViolation => AnyObject::PolicyViolation(decode_entity(element)?),
            ObjectClass::Scope => AnyObject::Scope(decode_entity(element)?),
            ObjectClass::Server => AnyObject::Server(decode_entity(element)?),
            ObjectClass::ServerStatistic => AnyObject::ServerStatistic(decode_entity(element)?),
            ObjectClass::Rule => AnyObject::Rule(decode_entity(element)?),
            ObjectClass::TaskDefinition => AnyObject::TaskDefinition(decode_entity(element)?),
            ObjectClass::TaskResult => AnyObject::TaskResult(decode_entity(element)?),
        };
        Ok(object)
    }

    /// Writes one object as a complete document.
    ///
    /// ## Errors
    ///
    /// Returns an error if the writer fails.
    pub fn to_xml(&self, object: &AnyObject) -> XmlResult<String> {
        self.encode(object).write_document(self.options.indent)
    }

    /// Reads one object from a document whose root is the object element.
    ///
    /// ## Errors
    ///
    /// Returns an error if the document is malformed or its root is not
    /// an object element.
    pub fn from_xml(&self, xml: &str) -> XmlResult<AnyObject> {
        self.decode(&Element::parse(xml)?)
    }

    /// Reads every object in a document.
    ///
    /// The root may be a `<sailpoint>` wrapper holding any number of
    /// objects, or a single object element.
    ///
    /// ## Errors
    ///
    /// Returns an error on the first malformed object.
    pub fn parse_objects(&self, xml: &str) -> XmlResult<Vec<AnyObject>> {
        let root = Element::parse(xml)?;
        if root.name != WRAPPER_ELEMENT {
            return Ok(vec![self.decode(&root)?]);
        }
        let objects = root
            .children
            .iter()
            .map(|child| self.decode(child))
            .collect::<XmlResult<Vec<_>>>()?;
        debug!(count = objects.len(), "Parsed object document");
        Ok(objects)
    }

    /// Writes objects inside a `<sailpoint>` wrapper.
    ///
    /// ## Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_objects<'a>(&self, objects: impl IntoIterator<Item = &'a AnyObject>) -> XmlResult<String> {
        let mut root = Element::new(WRAPPER_ELEMENT);
        root.children = objects.into_iter().map(|o| self.encode(o)).collect();
        root.write_document(self.options.indent)
    }
}

/// Writes one object with default options.
///
/// ## Errors
///
/// Returns an error if the writer fails.
pub fn to_xml(object: &AnyObject) -> XmlResult<String> {
    XmlCodec::new().to_xml(object)
}

/// Reads one object.
///
/// ## Errors
///
/// Returns an error if the document is malformed.
pub fn from_xml(xml: &str) -> XmlResult<AnyObject> {
    XmlCodec::new().from_xml(xml)
}

/// Reads every object in a document.
///
/// ## Errors
///
/// Returns an error on the first malformed object.
pub fn parse_objects(xml: &str) -> XmlResult<Vec<AnyObject>> {
    XmlCodec::new().parse_objects(xml)
}
