//! XML parser
//!
//! Builds owned [`Element`] trees from XML text. Comments and processing
//! instructions are dropped; whitespace-only text between child elements is
//! discarded so that pretty-printed input does not leak formatting into the
//! tree.

use std::path::Path;

use mix_ir::{Attribute, Document, DocumentMetadata, Element, Namespace};
use roxmltree::ParsingOptions;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Parser for XML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML parser
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a document from XML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the text is not well-formed XML.
    pub fn parse_str(&self, text: &str, source_name: &str) -> Result<Document> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let xml = roxmltree::Document::parse_with_options(text, options).map_err(|e| {
            let pos = e.pos();
            Error::Parse {
                source_name: source_name.to_string(),
                line: pos.row,
                column: pos.col,
                message: e.to_string(),
            }
        })?;

        let root = convert_element(xml.root_element());
        debug!(
            source = source_name,
            root = %root.qualified_name(),
            elements = root.descendant_count() + 1,
            "parsed XML document"
        );

        Ok(Document::with_metadata(
            root,
            DocumentMetadata {
                source: Some(source_name.to_string()),
                parsed_at: Some(chrono::Utc::now()),
            },
        ))
    }

    /// Parse a document from a file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Parse`] when its content is not well-formed XML.
    pub fn parse_file(&self, path: &Path) -> Result<Document> {
        trace!("Reading XML file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content, &path.display().to_string())
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(tag.name());
    element.namespace = tag.namespace().map(|uri| Namespace {
        uri: uri.to_string(),
        prefix: prefix_for(node, uri),
    });

    element.attributes = node
        .attributes()
        .map(|attr| Attribute {
            name: attr.name().to_string(),
            namespace: attr.namespace().map(str::to_string),
            prefix: attr.namespace().and_then(|uri| prefix_for(node, uri)),
            value: attr.value().to_string(),
        })
        .collect();

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            element.children.push(convert_element(child));
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }

    let whitespace_only = text.trim().is_empty();
    if !text.is_empty() && !(whitespace_only && !element.children.is_empty()) {
        element.text = Some(text);
    }

    element
}

fn prefix_for(node: roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    node.lookup_prefix(uri)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}
