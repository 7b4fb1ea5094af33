//! Query Module
//!
//! Turns listing request parameters into filters, sort order and page bounds
//! shared by every data source.

mod builder;
mod filter;

#[cfg(test)]
mod property_tests;

pub use builder::QueryBuilder;
pub use filter::{ListingSpec, PageRequest, PropertyFilter, SortField, SortOrder, SortSpec};
