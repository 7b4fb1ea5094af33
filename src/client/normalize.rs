//! Defensive mapping of listing records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::SortOrder;

/// A listing record as shown by a frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price_usd: f64,
    pub images: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    pub featured: bool,
}

/// Maps one raw record. Either id spelling is accepted (`_id` wins), a
/// numeric `price` wins over `priceUsd`, and anything unusable becomes
/// empty or zero.
pub fn normalize_property(raw: &Value) -> PropertyItem {
    let id = id_of(raw.get("_id"))
        .or_else(|| id_of(raw.get("id")))
        .unwrap_or_default();
    let price_usd = match raw.get("price") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => raw.get("priceUsd").and_then(number).unwrap_or(0.0),
    };
    let images = match raw.get("images") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    PropertyItem {
        id,
        title: text(raw.get("title")).unwrap_or_default(),
        description: text(raw.get("description")),
        price_usd,
        images,
        property_type: text(raw.get("type")),
        status: text(raw.get("status")),
        address: text(raw.get("address")),
        bedrooms: raw.get("bedrooms").and_then(count),
        bathrooms: raw.get("bathrooms").and_then(count),
        featured: raw.get("featured").is_some_and(truthy),
    }
}

/// Maps every record and drops the ones without an id.
pub fn normalize_properties(raw: &[Value]) -> Vec<PropertyItem> {
    raw.iter()
        .map(normalize_property)
        .filter(|p| !p.id.is_empty())
        .collect()
}

/// Stable local re-sort by price.
pub fn sort_by_price(items: &mut [PropertyItem], order: SortOrder) {
    items.sort_by(|a, b| {
        let ordering = a.price_usd.total_cmp(&b.price_usd);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value?.as_str().map(str::to_string)
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn count(value: &Value) -> Option<u32> {
    let n = number(value)?;
    (0.0..=f64::from(u32::MAX)).contains(&n).then(|| n as u32)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
