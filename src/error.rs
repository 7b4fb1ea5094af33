//! Error types for the catalog service
//!
//! Provides unified error handling using thiserror. Every failure reaches the
//! client as a plain `{"message": ...}` body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::MessageResponse;
use crate::store::StoreError;

/// Message returned for every 5xx response. Details stay in the logs.
pub const INTERNAL_MESSAGE: &str = "Error interno del servidor";

// == Api Error Enum ==
/// Unified error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed client input
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated principal lacks the required role
    #[error("{0}")]
    Forbidden(String),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Client exceeded a rate limit
    #[error("{0}")]
    TooManyRequests(String),

    /// Store or fallback source failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Anything else that should never happen
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for the property not-found error.
    pub fn property_not_found() -> Self {
        ApiError::NotFound("Propiedad no encontrada".to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::Store(err) => {
                error!(error = %err, "Store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        (status, Json(MessageResponse::new(message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog service.
pub type Result<T> = std::result::Result<T, ApiError>;
