//! Target paths
//!
//! A target path is a `/`-separated list of element names below a
//! destination element. Materializing it walks the destination, reusing a
//! child with the same name and namespace at each step and appending a new
//! one when none exists.

use std::fmt;

use mix_ir::{Element, Namespace};
use regex::Regex;
use tracing::trace;

const SEGMENT_PATTERN: &str = r"^[\p{Alphabetic}_][\p{Alphabetic}\p{N}_.-]*$";

/// Parsed target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    segments: Vec<String>,
}

impl TargetPath {
    /// Parse a target path such as `ImageInformation/XResolution`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRule`] (index 0) when the path is empty
    /// or a segment is not a plain element name. Callers compiling a rule
    /// list re-attach the real index.
    pub fn parse(text: &str) -> crate::Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(crate::Error::invalid_rule(0, "target path is empty"));
        }

        let pattern = Regex::new(SEGMENT_PATTERN)
            .map_err(|e| crate::Error::invalid_rule(0, format!("segment pattern: {e}")))?;

        let segments = text
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    Err(crate::Error::invalid_rule(
                        0,
                        format!("target path '{text}' has an empty segment"),
                    ))
                } else if pattern.is_match(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(crate::Error::invalid_rule(
                        0,
                        format!("target segment '{segment}' is not an element name"),
                    ))
                }
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Element names from outermost to innermost
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk (and extend) `root` along this path, returning the deepest element
    pub fn materialize<'a>(&self, root: &'a mut Element, namespace: &Namespace) -> &'a mut Element {
        let mut current = root;
        for segment in &self.segments {
            let existing = current.children.iter().position(|child| {
                child.name == *segment && child.namespace_uri() == Some(namespace.uri.as_str())
            });
            let index = match existing {
                Some(index) => index,
                None => {
                    trace!(parent = %current.name, element = %segment, "creating target element");
                    current.children.push(Element::new_in(segment.as_str(), namespace));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        current
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
