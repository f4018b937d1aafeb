//! Mapping DSL
//!
//! Rule files are YAML documents holding the destination namespace, the
//! prefixes usable in source queries, and an ordered list of rules:
//!
//! ```yaml
//! namespace:
//!   uri: http://www.loc.gov/mix/v20
//!   prefix: mix
//! source_namespaces:
//!   jhove: http://schema.openpreservation.org/ois/xml/ns/jhove
//! rules:
//!   - source: //jhove:property[jhove:name='XResolution']//jhove:value
//!     target: ImageAssessmentMetadata/SpatialMetrics/xSamplingFrequency
//!     transform: rational-to-pair
//! ```

use std::collections::BTreeMap;
use std::fmt;

use mix_ir::Namespace;
use serde::{Deserialize, Serialize};

/// One field-transport rule as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDefinition {
    /// Query evaluated against the source document
    pub source: String,

    /// Slash-separated element names below the destination element
    pub target: String,

    /// Transform token; `identity` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

impl RuleDefinition {
    /// Create a rule definition
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        transform: Option<&str>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            transform: transform.map(str::to_string),
        }
    }
}

/// A complete rule file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSet {
    /// Namespace for elements created in the destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,

    /// Prefix → URI bindings available to source queries
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub source_namespaces: BTreeMap<String, String>,

    /// Rules in application order
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// Value transform applied to a located source value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Copy the text verbatim
    Identity,

    /// `"a/b"` becomes the decimal quotient; text without `/` is copied
    RationalToDecimal,

    /// `"a/b"` becomes `numerator`/`denominator` child elements
    RationalToPair,
}

impl TransformKind {
    /// Every supported transform
    pub const ALL: [TransformKind; 3] = [
        TransformKind::Identity,
        TransformKind::RationalToDecimal,
        TransformKind::RationalToPair,
    ];

    /// Parse a configuration token (kebab-case or snake_case)
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().replace('_', "-").as_str() {
            "identity" => Some(Self::Identity),
            "rational-to-decimal" => Some(Self::RationalToDecimal),
            "rational-to-pair" => Some(Self::RationalToPair),
            _ => None,
        }
    }

    /// Canonical configuration token
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::RationalToDecimal => "rational-to-decimal",
            Self::RationalToPair => "rational-to-pair",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How unrecognized transform tokens are treated at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformPolicy {
    /// Reject the rule
    #[default]
    Strict,

    /// Treat the token as `rational-to-decimal`
    Lenient,
}

/// DSL Parser
pub struct MappingDsl;

/// Parse error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, " at line {line}, column {col}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl MappingDsl {
    /// Parse a rule set from YAML
    ///
    /// # Errors
    ///
    /// Returns an error when YAML parsing fails.
    pub fn parse(yaml: &str) -> Result<RuleSet, ParseError> {
        serde_yaml::from_str(yaml).map_err(|e| ParseError {
            message: format!("Failed to parse rules: {e}"),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
        })
    }

    /// Parse a rule set from a file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn parse_file(path: &std::path::Path) -> Result<RuleSet, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError {
            message: format!("Failed to read file {}: {e}", path.display()),
            line: None,
            column: None,
        })?;
        Self::parse(&content)
    }

    /// Serialize a rule set to YAML
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_yaml(rules: &RuleSet) -> Result<String, ParseError> {
        serde_yaml::to_string(rules).map_err(|e| ParseError {
            message: format!("Failed to serialize: {e}"),
            line: None,
            column: None,
        })
    }
}
