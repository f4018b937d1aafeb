#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # mix-ir
//!
//! Owned element tree and traversal APIs for MIX documents.
//!
//! This crate provides a mutable, namespace-aware tree in which every node is
//! exclusively owned by its parent. The schema sorter and the mapping engine
//! both mutate these trees in place; no back references are kept.

/// Document container and top-level metadata accessors.
pub mod document;
/// Core tree node model: elements, attributes and namespaces.
pub mod node;
/// Cursor, visitor and iterator helpers for navigating element trees.
pub mod traversal;

/// Primary document type.
pub use document::{Document, DocumentMetadata};
/// Node primitives for tree structure.
pub use node::{Attribute, Element, Namespace};
/// Traversal entry points for tree navigation.
pub use traversal::{Cursor, Descendants, Traversal, walk};

use thiserror::Error;

/// Errors that can occur when working with the IR
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for IR operations.
pub type Result<T> = std::result::Result<T, Error>;
