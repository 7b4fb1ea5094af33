//! API Handlers
//!
//! HTTP request handlers for each catalog endpoint.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequest, Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    Json,
};
use tracing::info;

use super::middleware::LoginLimiter;
use crate::auth::{AdminUser, AuthService, AuthUser};
use crate::catalog::CatalogService;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    AuthCheckResponse, ContactRequest, ContactResponse, CreatePropertyRequest, HealthResponse,
    ListingParams, ListingResponse, LoginRequest, LoginResponse, Property, UpdatePropertyRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub auth: Arc<AuthService>,
    /// Deployment label reported by the health endpoint
    pub environment: String,
    pub login_limiter: Arc<LoginLimiter>,
    /// CORS allow-list applied by the router
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// State with the default login limit and origin allow-list.
    pub fn new(catalog: CatalogService, auth: AuthService, environment: impl Into<String>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            auth: Arc::new(auth),
            environment: environment.into(),
            login_limiter: Arc::new(LoginLimiter::default()),
            cors_origins: Config::default().cors_origins,
        }
    }

    /// Applies the configured login limit and origin allow-list.
    pub fn from_config(catalog: CatalogService, auth: AuthService, config: &Config) -> Self {
        Self::new(catalog, auth, config.environment.clone())
            .with_login_limiter(LoginLimiter::from_config(config))
            .with_cors_origins(config.cors_origins.clone())
    }

    pub fn with_login_limiter(mut self, limiter: LoginLimiter) -> Self {
        self.login_limiter = Arc::new(limiter);
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth)
    }
}

/// JSON body extractor whose rejections use the `{"message"}` error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Handler for GET /api/properties
///
/// The query string is parsed leniently: repeated keys keep their first
/// value and nothing in it can reject the request.
pub async fn list_properties_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<(HeaderMap, Json<ListingResponse>)> {
    let params = ListingParams::from_query(query.as_deref().unwrap_or_default());
    let response = state.catalog.list(&params).await?;

    let pagination = &response.pagination;
    let mut headers = HeaderMap::new();
    headers.insert("x-total-count", HeaderValue::from(pagination.total_count));
    headers.insert("x-page", HeaderValue::from(pagination.current_page));
    headers.insert("x-limit", HeaderValue::from(pagination.limit));
    headers.insert("x-total-pages", HeaderValue::from(pagination.total_pages));

    Ok((headers, Json(response)))
}

/// Handler for GET /api/properties/:id
pub async fn get_property_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>> {
    Ok(Json(state.catalog.detail(&id).await?))
}

/// Handler for POST /api/properties
pub async fn create_property_handler(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(req): AppJson<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<Property>)> {
    let new = req.validate()?;
    let created = state.catalog.create(new).await?;
    info!(id = %created.id, by = %admin.user.username, "Create request served");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /api/properties/:id
///
/// Only fields present in the body are changed.
pub async fn update_property_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdatePropertyRequest>,
) -> Result<Json<Property>> {
    let patch = req.into_patch()?;
    Ok(Json(state.catalog.update(&id, &patch).await?))
}

/// Handler for DELETE /api/properties/:id
pub async fn delete_property_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/contact
///
/// The message is only logged.
pub async fn contact_handler(AppJson(req): AppJson<ContactRequest>) -> Result<Json<ContactResponse>> {
    let contact = req.validate()?;
    info!(
        name = %contact.name,
        email = %contact.email,
        message = %contact.message,
        "Contact message received"
    );
    Ok(Json(ContactResponse::sent()))
}

/// Handler for POST /api/login
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (username, password) = req.credentials()?;
    Ok(Json(state.auth.login(&username, &password)?))
}

/// Handler for GET /api/auth-check
pub async fn auth_check_handler(user: AuthUser) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        success: true,
        user: user.user,
    })
}

/// Handler for GET /api/health
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let database = state
        .catalog
        .database_health(state.auth.accounts().len())
        .await?;
    let cache = state.catalog.cache_stats().await;
    Ok(Json(HealthResponse::ok(&state.environment, database, cache)))
}
