//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::models::property::Property;

/// Pagination metadata attached to every listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub limit: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Computes page metadata from the filtered total.
    pub fn new(page: u64, limit: u64, total_count: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_count.div_ceil(limit)
        };
        Self {
            current_page: page,
            total_pages,
            total_count,
            limit,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Response body for `GET /api/properties`
#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    pub properties: Vec<Property>,
    pub pagination: Pagination,
}

/// Store connectivity and record counts reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub properties: u64,
    pub users: usize,
}

/// Response body for the health endpoint (GET /api/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "OK")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub environment: String,
    pub database: DatabaseHealth,
    pub cache: CacheStats,
}

impl HealthResponse {
    /// Creates an OK HealthResponse with current timestamp
    pub fn ok(environment: impl Into<String>, database: DatabaseHealth, cache: CacheStats) -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            environment: environment.into(),
            database,
            cache,
        }
    }
}

/// Response body for `POST /api/contact`
#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub ok: bool,
    pub message: String,
}

impl ContactResponse {
    pub fn sent() -> Self {
        Self {
            ok: true,
            message: "Mensaje enviado correctamente".to_string(),
        }
    }
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// Response body for `POST /api/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

/// Response body for `GET /api/auth-check`
#[derive(Debug, Clone, Serialize)]
pub struct AuthCheckResponse {
    pub success: bool,
    pub user: UserInfo,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Human-readable description of what went wrong
    pub message: String,
}

impl MessageResponse {
    /// Creates a new MessageResponse
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(1, 12, 13);
        assert_eq!(p.total_pages, 2);
        assert!(p.has_next_page);
        assert!(!p.has_prev_page);

        let p = Pagination::new(2, 12, 13);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn test_pagination_empty_result() {
        let p = Pagination::new(1, 12, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(3, 10, 25)).unwrap();
        assert_eq!(json["currentPage"], 3);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalCount"], 25);
        assert_eq!(json["hasNextPage"], false);
        assert_eq!(json["hasPrevPage"], true);
    }

    #[test]
    fn test_health_response_serialize() {
        let database = DatabaseHealth {
            connected: false,
            properties: 4,
            users: 1,
        };
        let resp = HealthResponse::ok("development", database, CacheStats::new());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "OK");
        assert_eq!(json["database"]["connected"], false);
        assert_eq!(json["database"]["properties"], 4);
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_contact_response_serialize() {
        let json = serde_json::to_value(ContactResponse::sent()).unwrap();
        assert_eq!(json["ok"], true);
    }

    #[test]
    fn test_message_response_serialize() {
        let resp = MessageResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("message"));
        assert!(json.contains("Something went wrong"));
    }
}
