//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming query strings and HTTP request bodies.

use serde::Deserialize;

use crate::error::ApiError;
use crate::models::property::{NewProperty, PropertyPatch, PropertyStatus};

/// Raw query parameters of `GET /api/properties`.
///
/// Every field stays a string so malformed values can fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub featured: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListingParams {
    /// Parses a raw query string. Unknown keys are ignored and a repeated key
    /// keeps its first value.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "type" => &mut params.property_type,
                "status" => &mut params.status,
                "featured" => &mut params.featured,
                "minPrice" => &mut params.min_price,
                "maxPrice" => &mut params.max_price,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "sort" => &mut params.sort,
                "order" => &mut params.order,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// True when any recognized filter parameter carries a non-empty value.
    pub fn has_filters(&self) -> bool {
        [
            &self.property_type,
            &self.status,
            &self.featured,
            &self.min_price,
            &self.max_price,
        ]
        .into_iter()
        .any(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

/// Request body for `POST /api/properties`.
///
/// The price arrives as `priceUsd` from the frontend; `price` is accepted too
/// and wins when both are sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<f64>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub bathrooms: Option<u32>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<PropertyStatus>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lng: Option<f64>,
}

impl CreatePropertyRequest {
    /// Validates the body into a [`NewProperty`].
    pub fn validate(self) -> Result<NewProperty, ApiError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let (Some(title), Some(price)) = (title, self.price.or(self.price_usd)) else {
            return Err(ApiError::BadRequest(
                "Título y precio son requeridos".to_string(),
            ));
        };
        let price = validate_price(price)?;

        Ok(NewProperty {
            title,
            description: self.description.unwrap_or_default(),
            price,
            address: self.address,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            images: self.images.unwrap_or_default(),
            property_type: self.property_type.unwrap_or_default(),
            status: self.status,
            featured: self.featured.unwrap_or(false),
            lat: self.lat,
            lng: self.lng,
        })
    }
}

/// Request body for `PUT /api/properties/:id`. Absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<f64>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub bathrooms: Option<u32>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<PropertyStatus>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lng: Option<f64>,
}

impl UpdatePropertyRequest {
    /// Validates the body into a [`PropertyPatch`].
    pub fn into_patch(self) -> Result<PropertyPatch, ApiError> {
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(ApiError::BadRequest(
                "El título no puede estar vacío".to_string(),
            ));
        }
        let price = self
            .price
            .or(self.price_usd)
            .map(validate_price)
            .transpose()?;

        Ok(PropertyPatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            price,
            address: self.address,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            images: self.images,
            property_type: self.property_type,
            status: self.status,
            featured: self.featured,
            lat: self.lat,
            lng: self.lng,
        })
    }
}

fn validate_price(price: f64) -> Result<f64, ApiError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ApiError::BadRequest(
            "El precio debe ser un número no negativo".to_string(),
        ))
    }
}

/// Request body for `POST /api/contact`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// A contact message with every field present.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactRequest {
    pub fn validate(self) -> Result<ContactMessage, ApiError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (present(self.name), present(self.email), present(self.message)) {
            (Some(name), Some(email), Some(message)) => Ok(ContactMessage {
                name,
                email,
                message,
            }),
            _ => Err(ApiError::BadRequest("Datos incompletos".to_string())),
        }
    }
}

/// Request body for `POST /api/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the trimmed username and the password, both required.
    pub fn credentials(self) -> Result<(String, String), ApiError> {
        let username = self
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        let password = self.password.filter(|p| !p.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(ApiError::BadRequest(
                "Usuario y contraseña son requeridos".to_string(),
            )),
        }
    }
}

/// Numeric fields that older clients send as strings.
mod lenient {
    use serde::{de, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| de::Error::custom("expected a non-negative integer")),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid integer: {s}"))),
            Some(other) => Err(de::Error::custom(format!("expected a number, got {other}"))),
        }
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid number: {s}"))),
            Some(other) => Err(de::Error::custom(format!("expected a number, got {other}"))),
        }
    }
}
