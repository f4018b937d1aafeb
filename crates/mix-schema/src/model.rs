//! Schema element order model

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Where children whose name the schema does not declare end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPlacement {
    /// Before every declared name
    #[default]
    First,

    /// After every declared name
    Last,
}

/// Ordered element names taken from a schema's element declarations.
///
/// Immutable after construction. Lookups go through a name → position map
/// built once, so ranking a name is O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElementOrder {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl SchemaElementOrder {
    /// Build an order from names in declaration order.
    ///
    /// A name declared more than once keeps its first position.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut positions = HashMap::new();
        for name in names {
            let name = name.into();
            if !positions.contains_key(&name) {
                positions.insert(name.clone(), ordered.len());
                ordered.push(name);
            }
        }
        Self {
            names: ordered,
            positions,
        }
    }

    /// Declared names in order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of distinct declared names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names were declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of `name` in declaration order
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Sort key for `name`.
    ///
    /// With [`UnknownPlacement::First`] undeclared names rank 0 and declared
    /// names rank `1..=len`; with [`UnknownPlacement::Last`] declared names
    /// rank `0..len` and undeclared names rank `len`. All undeclared names
    /// share one rank, so a stable sort keeps their input order.
    #[must_use]
    pub fn rank(&self, name: &str, placement: UnknownPlacement) -> usize {
        match (self.position(name), placement) {
            (Some(position), UnknownPlacement::First) => position + 1,
            (Some(position), UnknownPlacement::Last) => position,
            (None, UnknownPlacement::First) => 0,
            (None, UnknownPlacement::Last) => self.len(),
        }
    }
}
