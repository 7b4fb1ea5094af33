//! Static fallback source.
//!
//! A bundled JSON array of property-shaped objects, read from disk on every
//! use while the store is unavailable. It is never written back.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::Property;
use crate::query::{ListingSpec, SortField};
use crate::store::Result;

#[derive(Debug, Clone)]
pub struct StaticFallback {
    path: PathBuf,
}

impl StaticFallback {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the whole file. Entries that are not valid property
    /// records are skipped; a file that is not a JSON array is an error.
    pub async fn load(&self) -> Result<Vec<Property>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let entries: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Property>(entry) {
                Ok(record) => records.push(record),
                Err(err) => warn!(
                    path = %self.path.display(),
                    index,
                    error = %err,
                    "Skipping malformed fallback record"
                ),
            }
        }
        debug!(path = %self.path.display(), count = records.len(), "Loaded static fallback");
        Ok(records)
    }

    /// Applies the filter predicates in memory, sorts only when the field is
    /// price, then slices the requested page.
    pub async fn query(&self, spec: &ListingSpec) -> Result<(Vec<Property>, u64)> {
        let mut matching: Vec<Property> = self
            .load()
            .await?
            .into_iter()
            .filter(|p| spec.filter.matches(p))
            .collect();
        if spec.sort.field == SortField::Price {
            spec.sort.apply(&mut matching);
        }
        let total = matching.len() as u64;
        Ok((spec.page.slice(&matching), total))
    }

    pub async fn find(&self, id: &str) -> Result<Option<Property>> {
        Ok(self.load().await?.into_iter().find(|p| p.id == id))
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.load().await?.len() as u64)
    }
}
