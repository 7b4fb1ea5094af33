//! Per-request data source selection.

use crate::models::Property;
use crate::query::ListingSpec;
use crate::store::{PropertyStore, Result, StaticFallback};

/// Where a read is served from, chosen once per request.
#[derive(Clone, Copy)]
pub enum DataSource<'a> {
    Store(&'a dyn PropertyStore),
    StaticFallback(&'a StaticFallback),
}

impl DataSource<'_> {
    pub fn is_store(&self) -> bool {
        matches!(self, DataSource::Store(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Store(_) => "store",
            DataSource::StaticFallback(_) => "static fallback",
        }
    }

    /// Filtered, sorted page plus the filtered total.
    pub async fn list(&self, spec: &ListingSpec) -> Result<(Vec<Property>, u64)> {
        match self {
            DataSource::Store(store) => store.query(spec).await,
            DataSource::StaticFallback(fallback) => fallback.query(spec).await,
        }
    }

    pub async fn count(&self) -> Result<u64> {
        match self {
            DataSource::Store(store) => store.count().await,
            DataSource::StaticFallback(fallback) => fallback.count().await,
        }
    }
}

impl std::fmt::Debug for DataSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
