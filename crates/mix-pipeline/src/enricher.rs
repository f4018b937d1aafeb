//! Report enrichment
//!
//! For every characterization report: find its single MIX record, copy
//! values from the report into the record through the mapping rules, put
//! the record into schema order and attach it to the page showing the
//! image.

use mix_ir::{Document, Element};
use mix_mapping::{MappingEngine, MappingReport, SourceQuery};
use mix_schema::{SchemaCache, SchemaOrderSorter};
use tracing::{debug, info, warn};

use crate::config::EnrichmentConfig;
use crate::host::HostDocument;
use crate::policies::TransformFailurePolicy;
use crate::stats::EnrichmentStats;
use crate::{Error, Result};

/// An enriched record together with what the mapping did to it
#[derive(Debug)]
pub struct EnrichedRecord {
    pub record: Element,
    pub mapping: MappingReport,
}

/// Enriches reports with one configuration.
///
/// The schema is loaded and the rules are compiled once, in
/// [`Enricher::new`]; afterwards the enricher is read-only.
#[derive(Debug)]
pub struct Enricher {
    sorter: SchemaOrderSorter,
    engine: MappingEngine,
    record_query: SourceQuery,
    on_transform_error: TransformFailurePolicy,
}

impl Enricher {
    /// Build an enricher, loading the schema through a private cache
    ///
    /// # Errors
    ///
    /// Fails when the schema cannot be loaded or a rule or the record
    /// query cannot be compiled.
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        Self::with_cache(config, &SchemaCache::new())
    }

    /// Build an enricher, loading the schema through `cache`
    ///
    /// # Errors
    ///
    /// See [`Enricher::new`].
    pub fn with_cache(config: &EnrichmentConfig, cache: &SchemaCache) -> Result<Self> {
        let sorter = cache.sorter(&config.schema, config.unknown_elements)?;
        let engine = MappingEngine::compile(&config.rules, &config.compile_options())?;
        let record_query = SourceQuery::compile(&config.record_query, &config.source_namespaces)
            .map_err(|e| Error::Config(format!("record_query: {e}")))?;

        info!(
            schema = %config.schema.display(),
            declared = sorter.order().len(),
            rules = engine.rules().len(),
            "enricher ready"
        );
        Ok(Self {
            sorter,
            engine,
            record_query,
            on_transform_error: config.on_transform_error,
        })
    }

    #[must_use]
    pub fn sorter(&self) -> &SchemaOrderSorter {
        &self.sorter
    }

    #[must_use]
    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    /// Enrich the MIX record of one report.
    ///
    /// Returns `Ok(None)` when the report holds no record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pipeline`] when the report holds more than one
    /// record, or when a rule fails and the policy is
    /// [`TransformFailurePolicy::Fail`].
    pub fn enrich_report(&self, report: &Document) -> Result<Option<EnrichedRecord>> {
        let source = report.source_name();
        let records = self.record_query.select(&report.root);
        let record = match records.as_slice() {
            [] => {
                warn!(report = source, "no MIX record found");
                return Ok(None);
            }
            [record] => *record,
            many => {
                return Err(Error::pipeline(
                    "locate record",
                    source,
                    format!("expected a single MIX record, found {}", many.len()),
                ));
            }
        };

        let mut record = record.clone();
        let mapping = self.engine.apply(&report.root, &mut record);
        if let Some(failure) = mapping.failures.first() {
            if self.on_transform_error == TransformFailurePolicy::Fail {
                return Err(Error::pipeline(
                    "map record",
                    source,
                    format!(
                        "rule #{} ({}): {}",
                        failure.index, failure.target, failure.error
                    ),
                ));
            }
        }

        self.sorter.fix_order(&mut record);
        debug!(
            report = source,
            applied = mapping.applied,
            skipped = mapping.skipped,
            failed = mapping.failures.len(),
            "record enriched"
        );
        Ok(Some(EnrichedRecord { record, mapping }))
    }

    /// Enrich `(image name, report)` pairs and attach the records to `host`
    ///
    /// # Errors
    ///
    /// Stops at the first report that [`Enricher::enrich_report`] rejects,
    /// or when the host refuses a link.
    pub fn run<H, I>(&self, reports: I, host: &mut H) -> Result<EnrichmentStats>
    where
        H: HostDocument,
        I: IntoIterator<Item = (String, Document)>,
    {
        let mut stats = EnrichmentStats::default();

        for (image_name, report) in reports {
            stats.reports += 1;

            let Some(enriched) = self.enrich_report(&report)? else {
                stats.without_record += 1;
                continue;
            };
            stats.transform_failures += enriched.mapping.failures.len();

            let Some(page) = host.find_page(&image_name) else {
                warn!(
                    image = %image_name,
                    report = report.source_name(),
                    "no page for image, record not attached"
                );
                stats.without_page += 1;
                continue;
            };

            let id = host.add_tech_md(enriched.record);
            host.link_page(page, &id)?;
            stats.enriched += 1;
        }

        info!(
            reports = stats.reports,
            enriched = stats.enriched,
            skipped = stats.skipped(),
            transform_failures = stats.transform_failures,
            "enrichment finished"
        );
        Ok(stats)
    }
}
