//! Query Builder
//!
//! Translates raw listing parameters into a [`ListingSpec`]. Malformed input
//! never fails the request; each value falls back to its default.

use tracing::debug;

use crate::config::Config;
use crate::models::ListingParams;
use crate::query::filter::{ListingSpec, PageRequest, PropertyFilter, SortField, SortOrder, SortSpec};

/// Page size bounds applied to every listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBuilder {
    default_limit: u64,
    max_limit: u64,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(12, 50)
    }
}

impl QueryBuilder {
    /// `max_limit` is raised to 1 and `default_limit` clamped into `[1, max_limit]`.
    pub fn new(default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_page_size, config.max_page_size)
    }

    pub fn max_limit(&self) -> u64 {
        self.max_limit
    }

    /// Builds the filter, sort and page bounds for a request.
    pub fn build(&self, params: &ListingParams) -> ListingSpec {
        ListingSpec {
            filter: self.filter(params),
            sort: self.sort(params),
            page: PageRequest::new(self.page(params), self.limit(params)),
            cacheable: !params.has_filters(),
        }
    }

    fn filter(&self, params: &ListingParams) -> PropertyFilter {
        PropertyFilter {
            property_type: non_empty(&params.property_type),
            status: non_empty(&params.status),
            featured: (params.featured.as_deref() == Some("true")).then_some(true),
            min_price: parse_price(&params.min_price),
            max_price: parse_price(&params.max_price),
        }
    }

    fn sort(&self, params: &ListingParams) -> SortSpec {
        let field = match params.sort.as_deref().filter(|s| !s.is_empty()) {
            None => SortField::default(),
            Some(name) => SortField::parse(name).unwrap_or_else(|| {
                debug!(sort = name, "Unknown sort field, using createdAt");
                SortField::default()
            }),
        };
        SortSpec::new(field, SortOrder::parse(params.order.as_deref()))
    }

    fn page(&self, params: &ListingParams) -> u64 {
        parse_int(&params.page).map_or(1, |page| page.max(1) as u64)
    }

    fn limit(&self, params: &ListingParams) -> u64 {
        match parse_int(&params.limit) {
            Some(limit) => (limit.max(1) as u64).min(self.max_limit),
            None => self.default_limit,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn parse_int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse::<i64>().ok())
}

fn parse_price(value: &Option<String>) -> Option<f64> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
