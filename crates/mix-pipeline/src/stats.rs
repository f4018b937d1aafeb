//! Run statistics

use serde::{Deserialize, Serialize};

/// Counters for one enrichment run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    /// Reports looked at
    pub reports: usize,
    /// Records attached to a page
    pub enriched: usize,
    /// Reports without a MIX record
    pub without_record: usize,
    /// Records whose image has no page in the host document
    pub without_page: usize,
    /// Rules that failed to transform their value
    pub transform_failures: usize,
}

impl EnrichmentStats {
    /// Reports that did not end up attached
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.without_record + self.without_page
    }
}
