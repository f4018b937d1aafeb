//! Mapping runtime
//!
//! Compiles rule definitions once and applies them, in order, to pairs of
//! source document and destination element.

use std::collections::BTreeMap;

use mix_ir::{Element, Namespace};
use tracing::{debug, warn};

use crate::dsl::{RuleDefinition, RuleSet, TransformKind, TransformPolicy};
use crate::query::SourceQuery;
use crate::target::TargetPath;
use crate::transforms::apply_transform;

/// MIX 2.0 namespace URI
pub const MIX_NAMESPACE_URI: &str = "http://www.loc.gov/mix/v20";

/// Settings used when compiling rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Namespace for elements created in the destination
    pub namespace: Namespace,

    /// Prefix → URI bindings for source queries
    pub source_namespaces: BTreeMap<String, String>,

    /// Treatment of unrecognized transform tokens
    pub transforms: TransformPolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            namespace: Namespace::new("mix", MIX_NAMESPACE_URI),
            source_namespaces: BTreeMap::new(),
            transforms: TransformPolicy::default(),
        }
    }
}

/// A rule ready to be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    /// Position in the configured rule list (zero-based)
    pub index: usize,
    pub source: SourceQuery,
    pub target: TargetPath,
    pub transform: TransformKind,
}

/// What happened when one rule was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// A value was written
    Applied,

    /// The source query matched nothing
    Skipped,
}

/// A rule whose value could not be transformed
#[derive(Debug)]
pub struct RuleFailure {
    pub index: usize,
    pub target: String,
    pub error: crate::Error,
}

/// Summary of one [`MappingEngine::apply`] call
#[derive(Debug, Default)]
pub struct MappingReport {
    pub applied: usize,
    pub skipped: usize,
    pub failures: Vec<RuleFailure>,
}

impl MappingReport {
    /// Whether every rule either applied or was skipped
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies compiled rules to destination trees.
///
/// The engine is immutable after compilation and can be shared between
/// threads working on different destination trees.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    rules: Vec<CompiledRule>,
    namespace: Namespace,
}

impl MappingEngine {
    /// Compile rule definitions
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRule`] for the first rule whose query,
    /// target path or (in strict mode) transform token is invalid.
    pub fn compile(rules: &[RuleDefinition], options: &CompileOptions) -> crate::Result<Self> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| compile_rule(index, rule, options))
            .collect::<crate::Result<Vec<_>>>()?;

        debug!(rules = rules.len(), namespace = %options.namespace.uri, "compiled mapping rules");
        Ok(Self {
            rules,
            namespace: options.namespace.clone(),
        })
    }

    /// Compile a parsed rule file; its namespace settings override the defaults
    ///
    /// # Errors
    ///
    /// See [`MappingEngine::compile`].
    pub fn from_rule_set(rule_set: &RuleSet, transforms: TransformPolicy) -> crate::Result<Self> {
        let defaults = CompileOptions::default();
        let options = CompileOptions {
            namespace: rule_set.namespace.clone().unwrap_or(defaults.namespace),
            source_namespaces: rule_set.source_namespaces.clone(),
            transforms,
        };
        Self::compile(&rule_set.rules, &options)
    }

    /// Compiled rules in application order
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Namespace used for created elements
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Apply every rule in order, continuing past transform failures
    pub fn apply(&self, source: &Element, destination: &mut Element) -> MappingReport {
        let mut report = MappingReport::default();
        for rule in &self.rules {
            match self.apply_rule(rule, source, destination) {
                Ok(RuleOutcome::Applied) => report.applied += 1,
                Ok(RuleOutcome::Skipped) => report.skipped += 1,
                Err(error) => {
                    warn!(
                        rule = rule.index,
                        target = %rule.target,
                        error = %error,
                        "mapping rule failed"
                    );
                    report.failures.push(RuleFailure {
                        index: rule.index,
                        target: rule.target.to_string(),
                        error,
                    });
                }
            }
        }
        report
    }

    /// Apply a single rule
    ///
    /// The value is transformed before the target path is materialized, so
    /// a failing rule leaves the destination untouched.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transform`] when the located value does not
    /// fit the rule's transform.
    pub fn apply_rule(
        &self,
        rule: &CompiledRule,
        source: &Element,
        destination: &mut Element,
    ) -> crate::Result<RuleOutcome> {
        let Some(found) = rule.source.first(source) else {
            debug!(rule = rule.index, query = %rule.source, "source value absent, rule skipped");
            return Ok(RuleOutcome::Skipped);
        };

        let value = apply_transform(found.text(), rule.transform)?;
        let target = rule.target.materialize(destination, &self.namespace);
        value.write_into(target, &self.namespace);
        Ok(RuleOutcome::Applied)
    }
}

fn compile_rule(
    index: usize,
    rule: &RuleDefinition,
    options: &CompileOptions,
) -> crate::Result<CompiledRule> {
    let source = SourceQuery::compile(&rule.source, &options.source_namespaces)
        .map_err(|e| crate::Error::invalid_rule(index, e.to_string()))?;

    let target = TargetPath::parse(&rule.target).map_err(|e| match e {
        crate::Error::InvalidRule { message, .. } => crate::Error::invalid_rule(index, message),
        other => other,
    })?;

    let transform = match rule.transform.as_deref() {
        None => TransformKind::Identity,
        Some(token) => match (TransformKind::from_token(token), options.transforms) {
            (Some(kind), _) => kind,
            (None, TransformPolicy::Lenient) => {
                warn!(
                    rule = index,
                    token,
                    "unknown transform, using rational-to-decimal"
                );
                TransformKind::RationalToDecimal
            }
            (None, TransformPolicy::Strict) => {
                return Err(crate::Error::invalid_rule(
                    index,
                    format!("unknown transform '{token}'"),
                ));
            }
        },
    };

    Ok(CompiledRule {
        index,
        source,
        target,
        transform,
    })
}
