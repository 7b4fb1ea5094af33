//! Catalog Client
//!
//! HTTP client for the listing endpoint used by frontends and scripts. Records
//! are normalized defensively so older payload shapes still render.

mod images;
mod normalize;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::Pagination;
use crate::query::SortOrder;

pub use images::{image_url, optimized_image_url, ImageSize, PLACEHOLDER_IMAGE};
pub use normalize::{normalize_properties, normalize_property, sort_by_price, PropertyItem};

/// Retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("all retries exhausted")]
    RetriesExhausted,
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Query parameters accepted by `GET /api/properties`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertiesFilters {
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl PropertiesFilters {
    /// Featured listings, newest first.
    pub fn featured(limit: u64) -> Self {
        Self {
            featured: Some(true),
            limit: Some(limit),
            sort: Some("createdAt".to_string()),
            order: Some(SortOrder::Desc),
            ..Default::default()
        }
    }

    /// Wire pairs for every set, non-empty value.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                pairs.push((key, value));
            }
        };
        push("type", self.property_type.clone());
        push("status", self.status.clone());
        push("featured", self.featured.map(|f| f.to_string()));
        push("minPrice", self.min_price.map(|p| p.to_string()));
        push("maxPrice", self.max_price.map(|p| p.to_string()));
        push("page", self.page.map(|p| p.to_string()));
        push("limit", self.limit.map(|l| l.to_string()));
        push("sort", self.sort.clone());
        push("order", self.order.map(|o| o.as_str().to_string()));
        pairs
    }
}

/// One normalized page of the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesPage {
    pub properties: Vec<PropertyItem>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    properties: Vec<Value>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

pub struct CatalogClient {
    http: Client,
    base_url: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Delay before the first retry; it doubles on every further attempt.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches one page and normalizes every record, dropping the ones that
    /// end up without an id.
    pub async fn fetch_properties(&self, filters: &PropertiesFilters) -> Result<PropertiesPage> {
        let mut url = self.base_url.join("api/properties")?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let body = self.get_json(url.clone()).await?;
        let raw = match serde_json::from_value::<RawPage>(body) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%url, error = %err, "Unexpected listing body, treating it as an empty page");
                RawPage {
                    properties: Vec::new(),
                    pagination: None,
                }
            }
        };
        Ok(PropertiesPage {
            properties: normalize_properties(&raw.properties),
            pagination: raw.pagination,
        })
    }

    pub async fn featured_properties(&self, limit: u64) -> Result<Vec<PropertyItem>> {
        Ok(self
            .fetch_properties(&PropertiesFilters::featured(limit))
            .await?
            .properties)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        debug!(%url, "Fetching catalog");

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay * 2u32.saturating_pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self.http.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json().await.map_err(ClientError::Http);
                    }
                    let err = ClientError::Status {
                        status: status.as_u16(),
                        reason: status.canonical_reason().unwrap_or_default().to_string(),
                    };
                    if status.is_client_error() {
                        return Err(err);
                    }
                    warn!(%status, attempt, "Catalog request failed");
                    last_error = Some(err);
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Catalog request failed");
                    last_error = Some(ClientError::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or(ClientError::RetriesExhausted))
    }
}
