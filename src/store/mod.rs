//! Store Module
//!
//! The authoritative property store behind a trait, the static JSON fallback,
//! the shared connection flag and the per-request data source selection.

mod fallback;
mod health;
mod memory;
#[cfg(feature = "mongo")]
mod mongo;
mod source;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewProperty, Property, PropertyPatch};
use crate::query::ListingSpec;

pub use fallback::StaticFallback;
pub use health::StoreHealth;
pub use memory::MemoryStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;
pub use source::DataSource;

// == Store Error ==
/// Failures raised by the store or the fallback source.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not be reached or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Fallback file could not be read
    #[error("fallback read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Fallback file is not a JSON array of properties
    #[error("fallback parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[cfg(feature = "mongo")]
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// == Property Store ==
/// Authoritative source of truth for property records.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Filtered, sorted page plus the filtered total.
    async fn query(&self, spec: &ListingSpec) -> Result<(Vec<Property>, u64)>;

    /// Every record, unfiltered and unpaginated, in store order.
    async fn list_all(&self) -> Result<Vec<Property>>;

    /// Looks a record up by identifier. Malformed identifiers are a miss.
    async fn find_by_id(&self, id: &str) -> Result<Option<Property>>;

    /// Persists a new record and returns it with its assigned identifier.
    async fn insert(&self, new: NewProperty) -> Result<Property>;

    /// Applies a partial patch; `None` when the record does not exist.
    async fn update(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>>;

    /// Removes a record permanently; `false` when it did not exist.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<u64>;

    /// Bulk-loads records keeping their identifiers where possible.
    async fn seed(&self, records: Vec<Property>) -> Result<usize>;
}
