//! Property domain model
//!
//! The persisted listing record plus the validated create input and the
//! partial patch applied by updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commercial status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyStatus {
    #[serde(rename = "En venta")]
    ForSale,
    #[serde(rename = "En alquiler")]
    ForRent,
}

impl PropertyStatus {
    /// Wire representation, used for exact-match filtering.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::ForSale => "En venta",
            PropertyStatus::ForRent => "En alquiler",
        }
    }
}

/// A real-estate listing as stored and served.
///
/// Absent optional numbers are omitted from the JSON rather than written as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PropertyRecord")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in USD
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(rename = "type", default)]
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Incoming record shape. Either identifier spelling and either price
/// spelling may be present, alone or together.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyRecord {
    #[serde(rename = "_id")]
    store_id: Option<String>,
    #[serde(rename = "id")]
    public_id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    price: Option<f64>,
    price_usd: Option<f64>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    bedrooms: Option<u32>,
    #[serde(default)]
    bathrooms: Option<u32>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(rename = "type", default)]
    property_type: String,
    #[serde(default)]
    status: Option<PropertyStatus>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

// `_id` wins over `id`, `price` wins over `priceUsd`.
impl TryFrom<PropertyRecord> for Property {
    type Error = String;

    fn try_from(record: PropertyRecord) -> Result<Self, Self::Error> {
        let id = record
            .store_id
            .filter(|id| !id.is_empty())
            .or(record.public_id)
            .ok_or_else(|| "missing field `_id`".to_string())?;
        let price = record
            .price
            .or(record.price_usd)
            .ok_or_else(|| "missing field `price`".to_string())?;
        Ok(Self {
            id,
            title: record.title,
            description: record.description,
            price,
            address: record.address,
            bedrooms: record.bedrooms,
            bathrooms: record.bathrooms,
            images: record.images,
            property_type: record.property_type,
            status: record.status,
            featured: record.featured,
            lat: record.lat,
            lng: record.lng,
            created_at: record.created_at,
        })
    }
}

impl Property {
    /// Builds a record from validated create input.
    pub fn from_new(id: impl Into<String>, new: NewProperty, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: new.title,
            description: new.description,
            price: new.price,
            address: new.address,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            images: new.images,
            property_type: new.property_type,
            status: new.status,
            featured: new.featured,
            lat: new.lat,
            lng: new.lng,
            created_at: Some(created_at),
        }
    }

    /// Status as its wire string, if set.
    pub fn status_str(&self) -> Option<&'static str> {
        self.status.map(|s| s.as_str())
    }
}

/// Validated input for creating a property.
///
/// Title is non-empty and price is finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub images: Vec<String>,
    pub property_type: String,
    pub status: Option<PropertyStatus>,
    pub featured: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl NewProperty {
    /// Minimal valid input, handy for seeding and tests.
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            price,
            address: None,
            bedrooms: None,
            bathrooms: None,
            images: Vec::new(),
            property_type: String::new(),
            status: None,
            featured: false,
            lat: None,
            lng: None,
        }
    }
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub address: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub images: Option<Vec<String>>,
    pub property_type: Option<String>,
    pub status: Option<PropertyStatus>,
    pub featured: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PropertyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the supplied fields in place, leaving the rest untouched.
    pub fn apply_to(&self, property: &mut Property) {
        if let Some(title) = &self.title {
            property.title = title.clone();
        }
        if let Some(description) = &self.description {
            property.description = description.clone();
        }
        if let Some(price) = self.price {
            property.price = price;
        }
        if let Some(address) = &self.address {
            property.address = Some(address.clone());
        }
        if let Some(bedrooms) = self.bedrooms {
            property.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = self.bathrooms {
            property.bathrooms = Some(bathrooms);
        }
        if let Some(images) = &self.images {
            property.images = images.clone();
        }
        if let Some(property_type) = &self.property_type {
            property.property_type = property_type.clone();
        }
        if let Some(status) = self.status {
            property.status = Some(status);
        }
        if let Some(featured) = self.featured {
            property.featured = featured;
        }
        if let Some(lat) = self.lat {
            property.lat = Some(lat);
        }
        if let Some(lng) = self.lng {
            property.lng = Some(lng);
        }
    }
}
