//! # mix-mapping
//!
//! Declarative field-transport rules for MIX enrichment.
//!
//! A rule names a source query (evaluated against a source document), a
//! slash-separated target path (materialized inside a destination element)
//! and a value transform. [`MappingEngine`] compiles rules once and applies
//! them in order, mutating the destination tree in place.

pub mod dsl;
mod numeric;
pub mod query;
pub mod runtime;
pub mod target;
pub mod transforms;

pub use dsl::{MappingDsl, ParseError, RuleDefinition, RuleSet, TransformKind, TransformPolicy};
pub use query::{QueryError, SourceQuery};
pub use runtime::{
    CompileOptions, CompiledRule, MappingEngine, MappingReport, RuleFailure, RuleOutcome,
    MIX_NAMESPACE_URI,
};
pub use target::TargetPath;
pub use transforms::TransformedValue;

use thiserror::Error;

/// Errors that can occur during mapping
#[derive(Error, Debug)]
pub enum Error {
    /// A rule cannot be compiled; raised before any document is processed.
    #[error("Invalid mapping rule #{index}: {message}")]
    InvalidRule { index: usize, message: String },

    /// A value does not have the shape its transform requires.
    #[error("Cannot transform '{value}': {message}")]
    Transform { value: String, message: String },

    #[error("DSL parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Build an invalid-rule error for the rule at `index` (zero-based).
    pub fn invalid_rule(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            index,
            message: message.into(),
        }
    }

    /// Build a transform error for the offending raw value.
    pub fn transform(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            value: value.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
