//! Process-wide cache of loaded schema element orders

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::loader::SchemaLoader;
use crate::model::{SchemaElementOrder, UnknownPlacement};
use crate::sorter::SchemaOrderSorter;
use crate::Result;

/// Thread-safe cache mapping schema paths to their loaded element order.
///
/// Each schema file is parsed at most once per cache (barring a race between
/// two first loads, where the first inserted order wins). Orders are handed
/// out as `Arc`s and are read-only.
#[derive(Debug, Default)]
pub struct SchemaCache {
    loader: SchemaLoader,
    orders: DashMap<PathBuf, Arc<SchemaElementOrder>>,
}

impl SchemaCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached order for `path`, loading it on first use
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SchemaLoad`] if the schema cannot be loaded.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<SchemaElementOrder>> {
        if let Some(cached) = self.orders.get(path) {
            debug!("Cache hit for schema: {:?}", path);
            return Ok(Arc::clone(cached.value()));
        }

        let loaded = Arc::new(self.loader.load_from_file(path)?);
        let entry = self
            .orders
            .entry(path.to_path_buf())
            .or_insert(loaded);
        Ok(Arc::clone(entry.value()))
    }

    /// Build a sorter backed by the cached order for `path`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SchemaLoad`] if the schema cannot be loaded.
    pub fn sorter(&self, path: &Path, placement: UnknownPlacement) -> Result<SchemaOrderSorter> {
        Ok(SchemaOrderSorter::with_placement(
            self.get_or_load(path)?,
            placement,
        ))
    }

    /// Whether an order for `path` is cached
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.orders.contains_key(path)
    }

    /// Number of cached schemas
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
