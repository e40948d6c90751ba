//! A minimal element tree over `quick_xml` events.
//!
//! Object XML is small and nested, so it is read into [`Element`] trees
//! and mapped from there rather than decoded straight off the event
//! stream.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{XmlError, XmlResult};

/// Document type written ahead of object documents.
pub const DOCTYPE: &str = r#"sailpoint PUBLIC "sailpoint.dtd" "sailpoint.dtd""#;

/// An XML element with its attributes, child elements and text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Element name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Character data, if any.
    pub text: Option<String>,
}

impl Element {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Adds a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets an attribute, replacing an earlier value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns every child with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether the element has neither attributes, children nor text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text.is_none()
    }

    /// Fails unless the element has the expected name.
    ///
    /// ## Errors
    ///
    /// Returns `XmlError::UnexpectedElement` on a mismatch.
    pub fn expect_name(&self, expected: &str) -> XmlResult<()> {
        if self.name == expected {
            Ok(())
        } else {
            Err(XmlError::unexpected(expected, &self.name))
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Parses a document and returns its root element.
    ///
    /// The XML declaration, doctype, comments and processing instructions
    /// are skipped. Text of leaf elements is kept verbatim; whitespace
    /// around the text of elements with children is layout and is trimmed.
    ///
    /// ## Errors
    ///
    /// Returns an error if the document is not well-formed or has no
    /// single root element.
    pub fn parse(xml: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Self> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| XmlError::malformed("unbalanced end tag"))?;
                    element.drop_layout_text();
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(top) = stack.last_mut() {
                        top.append_text(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(top) = stack.last_mut() {
                        top.append_text(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::malformed(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or(XmlError::Empty)
    }

    fn from_start(start: &BytesStart<'_>) -> XmlResult<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn attach(stack: &mut [Self], root: &mut Option<Self>, element: Self) -> XmlResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_some() => {
                return Err(XmlError::malformed("document has more than one root element"));
            }
            None => *root = Some(element),
        }
        Ok(())
    }

    fn drop_layout_text(&mut self) {
        if self.children.is_empty() {
            return;
        }
        self.text = self
            .text
            .take()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Writes the element as an XML fragment.
    ///
    /// `indent` is the number of spaces per level; zero writes everything
    /// on one line.
    ///
    /// ## Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write(&self, indent: usize) -> XmlResult<String> {
        let mut writer = new_writer(indent);
        self.write_to(&mut writer)?;
        into_string(writer)
    }

    /// Writes the element as a complete document with the XML declaration
    /// and doctype.
    ///
    /// ## Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_document(&self, indent: usize) -> XmlResult<String> {
        let mut writer = new_writer(indent);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;
        self.write_to(&mut writer)?;
        into_string(writer)
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> XmlResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() && self.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

fn new_writer(indent: usize) -> Writer<Vec<u8>> {
    if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    }
}

fn into_string(writer: Writer<Vec<u8>>) -> XmlResult<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|e| XmlError::malformed(format!("writer produced invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE sailpoint PUBLIC "sailpoint.dtd" "sailpoint.dtd">
<!-- exported -->
<Identity name="alice" id="1">
  <Description>First &amp; only</Description>
  <Owner><Reference class="Identity" name="bob"/></Owner>
</Identity>"#;

        let root = Element::parse(xml).unwrap();
        assert_eq!(root.name, "Identity");
        assert_eq!(root.attr("name"), Some("alice"));
        assert_eq!(root.child("Description").and_then(Element::text), Some("First & only"));
        let reference = root.child("Owner").and_then(|o| o.child("Reference")).unwrap();
        assert_eq!(reference.attr("name"), Some("bob"));
        assert!(!reference.is_empty());
    }

    #[test]
    fn reads_cdata() {
        let root = Element::parse("<Source><![CDATA[a < b]]></Source>").unwrap();
        assert_eq!(root.text(), Some("a < b"));
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(Element::parse(""), Err(XmlError::Empty)));
        assert!(matches!(Element::parse("<a/><b/>"), Err(XmlError::Malformed(_))));
        assert!(Element::parse("<a><b></a>").is_err());
    }

    #[test]
    fn writes_and_reads_back() {
        let element = Element::new("Rule")
            .with_attr("name", "Quote \"test\"")
            .with_child(Element::new("Source").with_text("if (a < b) return;"))
            .with_child(Element::new("Empty"));

        for indent in [0, 2] {
            let xml = element.write(indent).unwrap();
            assert_eq!(Element::parse(&xml).unwrap(), element);
        }
        let compact = element.write(0).unwrap();
        assert!(compact.contains("<Empty/>"));
        assert!(compact.contains("&lt;"));
    }

    #[test]
    fn document_has_declaration_and_doctype() {
        let xml = Element::new("sailpoint").write_document(2).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<!DOCTYPE sailpoint PUBLIC"));
        assert_eq!(Element::parse(&xml).unwrap().name, "sailpoint");
    }

    #[test]
    fn leaf_text_keeps_surrounding_whitespace() {
        let xml = "<Rule>\n  <Source>\n    return x;\n</Source>\n  <String> padded </String>\n</Rule>";
        let root = Element::parse(xml).unwrap();
        assert_eq!(root.text(), None);
        assert_eq!(root.child("Source").and_then(Element::text), Some("\n    return x;\n"));
        assert_eq!(root.child("String").and_then(Element::text), Some(" padded "));

        let element = Element::new("List")
            .with_child(Element::new("String").with_text("  "))
            .with_child(Element::new("String").with_text(" a b "));
        for indent in [0, 4] {
            let xml = element.write(indent).unwrap();
            assert_eq!(Element::parse(&xml).unwrap(), element);
        }
    }

    #[test]
    fn set_attr_replaces() {
        let mut element = Element::new("a").with_attr("k", "1");
        element.set_attr("k", "2");
        assert_eq!(element.attributes, vec![("k".to_string(), "2".to_string())]);
    }
}
