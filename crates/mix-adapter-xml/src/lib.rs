//! # mix-adapter-xml
//!
//! XML parser/serializer for MIX element trees.
//!
//! Parsing is namespace-aware and produces an owned [`mix_ir::Document`];
//! serialization writes an [`mix_ir::Element`] back to XML text, declaring
//! namespace prefixes where they first come into scope.

pub mod parser;
pub mod serializer;

pub use parser::XmlParser;
pub use serializer::XmlSerializer;

use thiserror::Error;

/// Errors that can occur when parsing/serializing XML
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error in {source_name} at {line}:{column}: {message}")]
    Parse {
        source_name: String,
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
