//! Realty Catalog - real-estate listing service
//!
//! Public property catalog with filtering and pagination, a TTL-cached
//! unfiltered listing, a static JSON fallback for store outages and an
//! admin-gated CRUD surface.

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use catalog::CatalogService;
pub use config::Config;
pub use tasks::spawn_cache_sweep_task;
