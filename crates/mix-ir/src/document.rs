//! Document representation for the element tree
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

use crate::node::Element;
use serde::{Deserialize, Serialize};

/// A parsed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Root element of the document
    pub root: Element,

    /// Document-level metadata
    pub metadata: DocumentMetadata,
}

/// Metadata associated with a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source file path or identifier
    pub source: Option<String>,

    /// When the document was parsed
    pub parsed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Document {
    /// Create a new document with the given root element
    pub fn new(root: Element) -> Self {
        Self {
            root,
            metadata: DocumentMetadata::default(),
        }
    }

    /// Create a new document with metadata
    pub fn with_metadata(root: Element, metadata: DocumentMetadata) -> Self {
        Self { root, metadata }
    }

    /// Set the source identifier
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    /// Source identifier, or `<memory>` when none was recorded
    pub fn source_name(&self) -> &str {
        self.metadata.source.as_deref().unwrap_or("<memory>")
    }
}
