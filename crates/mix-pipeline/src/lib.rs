#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # mix-pipeline
//!
//! Enrichment orchestration for MIX technical metadata.
//!
//! An [`Enricher`] locates the MIX record inside each characterization
//! report, fills it from the report through the configured mapping rules,
//! puts it into schema order and attaches it to the matching page of a
//! [`HostDocument`].

pub mod config;
pub mod enricher;
pub mod host;
pub mod policies;
pub mod stats;

pub use config::EnrichmentConfig;
pub use enricher::{EnrichedRecord, Enricher};
pub use host::{HostDocument, InMemoryHost, Page, TechMd};
pub use policies::TransformFailurePolicy;
pub use stats::EnrichmentStats;

use thiserror::Error;

/// Errors that can occur during enrichment
#[derive(Error, Debug)]
pub enum Error {
    #[error("Pipeline error during {operation} for '{path}': {message}")]
    Pipeline {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },

    #[error(transparent)]
    Schema(#[from] mix_schema::Error),

    #[error(transparent)]
    Mapping(#[from] mix_mapping::Error),
}

impl Error {
    /// Create a structured pipeline error with operation/path context.
    pub fn pipeline(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Pipeline {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a structured I/O error with operation/path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
