//! Enrichment configuration
//!
//! ```yaml
//! schema: schema/mix.xsd
//! unknown_elements: first
//! namespace:
//!   uri: http://www.loc.gov/mix/v20
//!   prefix: mix
//! source_namespaces:
//!   j: http://schema.openpreservation.org/ois/xml/ns/jhove
//! transforms: strict
//! on_transform_error: report
//! record_query: //*[local-name()='mix']
//! rules:
//!   - source: //j:repInfo/j:format
//!     target: BasicDigitalObjectInformation/FormatDesignation/formatName
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mix_ir::Namespace;
use mix_mapping::{CompileOptions, MIX_NAMESPACE_URI, RuleDefinition, TransformPolicy};
use mix_schema::UnknownPlacement;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::policies::TransformFailurePolicy;
use crate::{Error, Result};

/// Query locating a MIX record regardless of its prefix
pub const DEFAULT_RECORD_QUERY: &str = "//*[local-name()='mix']";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Schema whose element declarations define sibling order
    pub schema: PathBuf,

    #[serde(default)]
    pub unknown_elements: UnknownPlacement,

    /// Namespace for elements created by mapping rules
    #[serde(default = "default_namespace")]
    pub namespace: Namespace,

    #[serde(default)]
    pub source_namespaces: BTreeMap<String, String>,

    #[serde(default)]
    pub transforms: TransformPolicy,

    #[serde(default)]
    pub on_transform_error: TransformFailurePolicy,

    #[serde(default = "default_record_query")]
    pub record_query: String,

    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

fn default_namespace() -> Namespace {
    Namespace::new("mix", MIX_NAMESPACE_URI)
}

fn default_record_query() -> String {
    DEFAULT_RECORD_QUERY.to_string()
}

impl EnrichmentConfig {
    /// Configuration with defaults for everything but the schema path
    pub fn new(schema: impl Into<PathBuf>) -> Self {
        Self {
            schema: schema.into(),
            unknown_elements: UnknownPlacement::default(),
            namespace: default_namespace(),
            source_namespaces: BTreeMap::new(),
            transforms: TransformPolicy::default(),
            on_transform_error: TransformFailurePolicy::default(),
            record_query: default_record_query(),
            rules: Vec::new(),
        }
    }

    /// Parse configuration from YAML
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the YAML is malformed or a field has
    /// an unknown value.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a file.
    ///
    /// A relative `schema` path is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Config`] when it cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io("read config", path.display().to_string(), e.to_string()))?;
        let mut config = Self::from_yaml(&content).map_err(|e| match e {
            Error::Config(message) => Error::Config(format!("{}: {message}", path.display())),
            other => other,
        })?;

        if config.schema.is_relative() {
            if let Some(base) = path.parent() {
                config.schema = base.join(&config.schema);
            }
        }

        debug!(
            config = %path.display(),
            schema = %config.schema.display(),
            rules = config.rules.len(),
            "loaded enrichment configuration"
        );
        Ok(config)
    }

    /// Options for compiling this configuration's rules
    #[must_use]
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            namespace: self.namespace.clone(),
            source_namespaces: self.source_namespaces.clone(),
            transforms: self.transforms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnrichmentConfig::from_yaml("schema: mix.xsd").unwrap();

        assert_eq!(config, EnrichmentConfig::new("mix.xsd"));
        assert_eq!(config.unknown_elements, UnknownPlacement::First);
        assert_eq!(config.namespace.uri, MIX_NAMESPACE_URI);
        assert_eq!(config.namespace.prefix.as_deref(), Some("mix"));
        assert_eq!(config.transforms, TransformPolicy::Strict);
        assert_eq!(config.on_transform_error, TransformFailurePolicy::Report);
        assert_eq!(config.record_query, DEFAULT_RECORD_QUERY);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_full_config() {
        let yaml = r"
schema: /etc/mix/mix20.xsd
unknown_elements: last
namespace:
  uri: urn:custom
source_namespaces:
  j: http://schema.openpreservation.org/ois/xml/ns/jhove
transforms: lenient
on_transform_error: fail
record_query: //j:mix
rules:
  - source: //j:format
    target: a/b
    transform: identity
";
        let config = EnrichmentConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.schema, PathBuf::from("/etc/mix/mix20.xsd"));
        assert_eq!(config.unknown_elements, UnknownPlacement::Last);
        assert_eq!(config.namespace, Namespace::default_ns("urn:custom"));
        assert_eq!(config.transforms, TransformPolicy::Lenient);
        assert_eq!(config.on_transform_error, TransformFailurePolicy::Fail);
        assert_eq!(config.record_query, "//j:mix");
        assert_eq!(config.rules, vec![RuleDefinition::new("//j:format", "a/b", Some("identity"))]);

        let options = config.compile_options();
        assert_eq!(options.namespace.uri, "urn:custom");
        assert_eq!(options.source_namespaces.len(), 1);
        assert_eq!(options.transforms, TransformPolicy::Lenient);
    }

    #[test]
    fn test_missing_schema_is_rejected() {
        let err = EnrichmentConfig::from_yaml("rules: []").unwrap_err();
        assert!(matches!(err, Error::Config(message) if message.contains("schema")));
    }

    #[test]
    fn test_unknown_policy_value_is_rejected() {
        assert!(EnrichmentConfig::from_yaml("schema: a.xsd\nunknown_elements: middle").is_err());
    }

    #[test]
    fn test_from_file_resolves_schema_relative_to_config() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("enrich.yaml");
        std::fs::write(&path, "schema: schema/mix.xsd\n")?;

        let config = EnrichmentConfig::from_file(&path)?;

        assert_eq!(config.schema, dir.path().join("schema/mix.xsd"));
        Ok(())
    }

    #[test]
    fn test_from_file_keeps_absolute_schema() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("enrich.yaml");
        std::fs::write(&path, "schema: /opt/mix.xsd\n")?;

        assert_eq!(EnrichmentConfig::from_file(&path)?.schema, PathBuf::from("/opt/mix.xsd"));
        Ok(())
    }

    #[test]
    fn test_from_file_missing() {
        let err = EnrichmentConfig::from_file(Path::new("/no/such/enrich.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io { operation, .. } if operation == "read config"));
    }
}
