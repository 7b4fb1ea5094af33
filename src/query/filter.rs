//! Filter predicates, sort specification and page bounds.
//!
//! These are shared by every data source so the store and the static fallback
//! agree on which records match.

use std::cmp::Ordering;

use crate::models::Property;

// == Property Filter ==
/// Exact-match and range predicates over a property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
}

impl PropertyFilter {
    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks every supplied predicate against the record.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(property_type) = &self.property_type {
            if property.property_type != *property_type {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if property.status_str() != Some(status.as_str()) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if property.featured != featured {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if property.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if property.price > max {
                return false;
            }
        }
        true
    }
}

// == Sorting ==
/// Fields a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Price,
    Title,
    Bedrooms,
    Bathrooms,
    Type,
    Status,
    Featured,
}

impl SortField {
    /// Parses a wire field name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(SortField::CreatedAt),
            "price" | "priceUsd" => Some(SortField::Price),
            "title" => Some(SortField::Title),
            "bedrooms" => Some(SortField::Bedrooms),
            "bathrooms" => Some(SortField::Bathrooms),
            "type" => Some(SortField::Type),
            "status" => Some(SortField::Status),
            "featured" => Some(SortField::Featured),
            _ => None,
        }
    }

    /// Document field name, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Price => "price",
            SortField::Title => "title",
            SortField::Bedrooms => "bedrooms",
            SortField::Bathrooms => "bathrooms",
            SortField::Type => "type",
            SortField::Status => "status",
            SortField::Featured => "featured",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `"asc"` is ascending, anything else descending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort field plus direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Compares two records by the field, honouring the direction.
    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let ordering = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Bedrooms => a.bedrooms.cmp(&b.bedrooms),
            SortField::Bathrooms => a.bathrooms.cmp(&b.bathrooms),
            SortField::Type => a.property_type.cmp(&b.property_type),
            SortField::Status => a.status_str().cmp(&b.status_str()),
            SortField::Featured => a.featured.cmp(&b.featured),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Stable in-place sort; ties keep their incoming order.
    pub fn apply(&self, properties: &mut [Property]) {
        properties.sort_by(|a, b| self.compare(a, b));
    }
}

// == Page Request ==
/// One-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Number of records before this page.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Cuts `(page-1)*limit .. page*limit` out of `items`.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.iter().skip(start).take(limit).cloned().collect()
    }
}

/// Everything a data source needs to answer a listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSpec {
    pub filter: PropertyFilter,
    pub sort: SortSpec,
    pub page: PageRequest,
    /// No recognized filter parameter was supplied, so the cache applies
    pub cacheable: bool,
}

impl ListingSpec {
    /// Filters, sorts and slices an in-memory list, returning the page and the
    /// filtered total.
    pub fn apply(&self, properties: &[Property]) -> (Vec<Property>, u64) {
        let mut matching: Vec<Property> = properties
            .iter()
            .filter(|p| self.filter.matches(p))
            .cloned()
            .collect();
        self.sort.apply(&mut matching);
        let total = matching.len() as u64;
        (self.page.slice(&matching), total)
    }
}
