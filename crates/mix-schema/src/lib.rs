//! # mix-schema
//!
//! Schema element order and schema-order sorting for MIX element trees.
//!
//! A [`SchemaLoader`] reads an XML Schema document once and records the order
//! in which element declarations appear. A [`SchemaOrderSorter`] then uses
//! that order as a canonical sibling ordering key and recursively reorders
//! element trees to match it.

pub mod loader;
pub mod model;
pub mod registry;
pub mod sorter;

pub use loader::SchemaLoader;
pub use model::{SchemaElementOrder, UnknownPlacement};
pub use registry::SchemaCache;
pub use sorter::SchemaOrderSorter;

use thiserror::Error;

/// Errors that can occur when working with schemas
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load schema '{source_name}': {message}")]
    SchemaLoad {
        source_name: String,
        message: String,
    },
}

impl Error {
    /// Build a schema load error naming the offending schema source.
    pub fn schema_load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaLoad {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
