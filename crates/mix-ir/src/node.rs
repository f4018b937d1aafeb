//! Node types for the element tree
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builders return Self for chaining.

use serde::{Deserialize, Serialize};

/// An XML namespace binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace URI
    pub uri: String,

    /// Preferred prefix used when serializing (None for the default namespace)
    pub prefix: Option<String>,
}

impl Namespace {
    /// Create a prefixed namespace
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix: Some(prefix.into()),
        }
    }

    /// Create a default (unprefixed) namespace
    pub fn default_ns(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix: None,
        }
    }
}

/// An attribute on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Local name
    pub name: String,

    /// Namespace URI, if the attribute is qualified
    pub namespace: Option<String>,

    /// Prefix used for a qualified attribute
    pub prefix: Option<String>,

    /// Attribute value (unescaped)
    pub value: String,
}

impl Attribute {
    /// Create an unqualified attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            prefix: None,
            value: value.into(),
        }
    }

    /// Name as written in a document (`prefix:name` or `name`)
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// An element in the tree.
///
/// Children are owned exclusively by their parent and kept in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Local name
    pub name: String,

    /// Namespace the element lives in
    pub namespace: Option<Namespace>,

    /// Attributes in document order
    pub attributes: Vec<Attribute>,

    /// Child elements in document order
    pub children: Vec<Element>,

    /// Text content (direct text only)
    pub text: Option<String>,
}

impl Element {
    /// Create an element with no namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create an element in the given namespace
    pub fn new_in(name: impl Into<String>, namespace: &Namespace) -> Self {
        Self {
            namespace: Some(namespace.clone()),
            ..Self::new(name)
        }
    }

    /// Set text content, builder style
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child, builder style
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Element) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Replace the text content
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    /// Set an unqualified attribute, replacing an existing one of the same name
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.is_none() && a.name == name)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
        self
    }

    /// Look up an attribute value by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Namespace URI of this element
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_ref().map(|ns| ns.uri.as_str())
    }

    /// Name as written in a document (`prefix:name` or `name`)
    pub fn qualified_name(&self) -> String {
        match self.namespace.as_ref().and_then(|ns| ns.prefix.as_deref()) {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Text content, or the empty string
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Find the first child by local name
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Find all children by local name
    pub fn find_children(&self, name: &str) -> Vec<&Element> {
        self.children.iter().filter(|c| c.name == name).collect()
    }

    /// Find the first child with the given local name and namespace URI
    pub fn find_child_in(&self, name: &str, namespace_uri: Option<&str>) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.name == name && c.namespace_uri() == namespace_uri)
    }

    /// Number of elements below this one (excluding itself)
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mix() -> Namespace {
        Namespace::new("mix", "http://www.loc.gov/mix/v20")
    }

    #[test]
    fn test_new_in_carries_namespace() {
        let element = Element::new_in("ImageWidth", &mix());
        assert_eq!(element.namespace_uri(), Some("http://www.loc.gov/mix/v20"));
        assert_eq!(element.qualified_name(), "mix:ImageWidth");
    }

    #[test]
    fn test_qualified_name_without_prefix() {
        let element = Element::new_in("root", &Namespace::default_ns("urn:x"));
        assert_eq!(element.qualified_name(), "root");
        assert_eq!(Element::new("plain").qualified_name(), "plain");
    }

    #[test]
    fn test_set_attribute_replaces_existing() {
        let mut element = Element::new("a");
        element.set_attribute("id", "1").set_attribute("id", "2");

        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attribute("id"), Some("2"));
        assert_eq!(element.attribute("missing"), None);
    }

    #[test]
    fn test_find_child_in_respects_namespace() {
        let root = Element::new("root")
            .with_child(Element::new("x"))
            .with_child(Element::new_in("x", &mix()));

        let found = root
            .find_child_in("x", Some("http://www.loc.gov/mix/v20"))
            .unwrap();
        assert!(found.namespace.is_some());
        assert!(root.find_child_in("x", None).unwrap().namespace.is_none());
        assert!(root.find_child_in("y", None).is_none());
    }

    #[test]
    fn test_find_children_and_count() {
        let root = Element::new("root")
            .with_child(Element::new("a").with_child(Element::new("b")))
            .with_child(Element::new("a"));

        assert_eq!(root.find_children("a").len(), 2);
        assert_eq!(root.descendant_count(), 3);
    }

    #[test]
    fn test_text_defaults_to_empty() {
        let mut element = Element::new("a");
        assert_eq!(element.text(), "");
        element.set_text("300/1");
        assert_eq!(element.text(), "300/1");
    }

    #[test]
    fn test_element_serde_roundtrip_preserves_structure() {
        let element = Element::new_in("mix", &mix())
            .with_child(Element::new_in("ImageWidth", &mix()).with_text("1024"));
        let json = serde_json::to_string(&element).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, element);
    }
}
