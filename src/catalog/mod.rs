//! Catalog Module
//!
//! Listing, detail and mutation flows over the store, the static fallback and
//! the listing cache.

mod service;

pub use service::CatalogService;
