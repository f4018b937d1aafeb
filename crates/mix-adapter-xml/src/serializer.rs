//! XML serializer
//!
//! Writes element trees as XML text. Namespace bindings are tracked per
//! scope and a declaration is emitted on the first element that needs a
//! binding not already in effect.

use std::io::Write;
use std::path::Path;

use mix_ir::{Document, Element};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::trace;

use crate::{Error, Result};

/// A namespace binding in effect: (prefix, uri); `None` is the default namespace.
type Binding = (Option<String>, String);

/// Serializer for element trees
#[derive(Debug, Clone, Copy)]
pub struct XmlSerializer {
    /// Spaces per nesting level; `None` writes everything on one line
    indent: Option<usize>,
}

impl Default for XmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlSerializer {
    /// Create a serializer that indents with two spaces
    #[must_use]
    pub fn new() -> Self {
        Self { indent: Some(2) }
    }

    /// Create a serializer that writes without line breaks
    #[must_use]
    pub fn compact() -> Self {
        Self { indent: None }
    }

    /// Serialize an element (with XML declaration) to a string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if writing fails.
    pub fn to_string(&self, element: &Element) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, element)?;
        String::from_utf8(buffer).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Serialize a document's root element to a string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if writing fails.
    pub fn document_to_string(&self, document: &Document) -> Result<String> {
        self.to_string(&document.root)
    }

    /// Serialize an element into a file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be created and
    /// [`Error::Serialize`] if writing fails.
    pub fn write_file(&self, path: &Path, element: &Element) -> Result<()> {
        trace!("Writing XML file: {:?}", path);
        let file = std::fs::File::create(path)?;
        let mut out = std::io::BufWriter::new(file);
        self.write(&mut out, element)?;
        out.flush()?;
        Ok(())
    }

    /// Serialize an element into any writer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if writing fails.
    pub fn write<W: Write>(&self, out: W, element: &Element) -> Result<()> {
        let mut writer = match self.indent {
            Some(size) => Writer::new_with_indent(out, b' ', size),
            None => Writer::new(out),
        };
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(serialize_error)?;
        let mut scope = Vec::new();
        write_element(&mut writer, element, &mut scope)?;
        if self.indent.is_some() {
            writer.get_mut().write_all(b"\n")?;
        }
        Ok(())
    }
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    scope: &mut Vec<Binding>,
) -> Result<()> {
    let qualified = element.qualified_name();
    let mut start = BytesStart::new(qualified.clone());

    let declared = declare_bindings(element, scope);
    for (prefix, uri) in &scope[scope.len() - declared..] {
        let key = match prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        start.push_attribute((key.as_str(), uri.as_str()));
    }

    for attribute in &element.attributes {
        start.push_attribute((attribute.qualified_name().as_str(), attribute.value.as_str()));
    }

    let text = element.text.as_deref().filter(|t| !t.is_empty());
    if element.children.is_empty() && text.is_none() {
        writer
            .write_event(Event::Empty(start))
            .map_err(serialize_error)?;
    } else {
        writer
            .write_event(Event::Start(start))
            .map_err(serialize_error)?;
        if let Some(text) = text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(serialize_error)?;
        }
        for child in &element.children {
            write_element(writer, child, scope)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(qualified)))
            .map_err(serialize_error)?;
    }

    scope.truncate(scope.len() - declared);
    Ok(())
}

/// Push the bindings `element` needs that are not in effect; returns how many were pushed.
fn declare_bindings(element: &Element, scope: &mut Vec<Binding>) -> usize {
    let mut needed: Vec<Binding> = Vec::new();

    match &element.namespace {
        Some(ns) => needed.push((ns.prefix.clone(), ns.uri.clone())),
        // An unqualified element under a default namespace has to undeclare it.
        None if in_effect(scope, None).is_some_and(|uri| !uri.is_empty()) => {
            needed.push((None, String::new()));
        }
        None => {}
    }
    for attribute in &element.attributes {
        if let (Some(prefix), Some(uri)) = (&attribute.prefix, &attribute.namespace) {
            needed.push((Some(prefix.clone()), uri.clone()));
        }
    }

    let before = scope.len();
    for (prefix, uri) in needed {
        let already = in_effect(scope, prefix.as_deref()) == Some(uri.as_str())
            || (prefix.is_none() && uri.is_empty() && in_effect(scope, None).is_none());
        if !already {
            scope.push((prefix, uri));
        }
    }
    scope.len() - before
}

fn in_effect<'a>(scope: &'a [Binding], prefix: Option<&str>) -> Option<&'a str> {
    scope
        .iter()
        .rev()
        .find(|(p, _)| p.as_deref() == prefix)
        .map(|(_, uri)| uri.as_str())
}

fn serialize_error(error: impl std::fmt::Display) -> Error {
    Error::Serialize(error.to_string())
}
