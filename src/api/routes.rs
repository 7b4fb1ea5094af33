//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use std::sync::Arc;

use axum::{
    http::{HeaderName, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use super::handlers::{
    auth_check_handler, contact_handler, create_property_handler, delete_property_handler,
    get_property_handler, health_handler, list_properties_handler, login_handler,
    update_property_handler, AppState,
};
use super::middleware::{cors_layer, login_rate_limit, SECURITY_HEADERS};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Login rate limit: `POST /api/login` only
/// - CORS: Credentialed, restricted to the configured origins, exposes the pagination headers
/// - Compression: gzip when the client accepts it
/// - Security headers: CSP, HSTS, `nosniff` and friends unless already set
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let login = post(login_handler).route_layer(middleware::from_fn_with_state(
        Arc::clone(&state.login_limiter),
        login_rate_limit,
    ));

    let router = Router::new()
        .route(
            "/api/properties",
            get(list_properties_handler).post(create_property_handler),
        )
        .route(
            "/api/properties/:id",
            get(get_property_handler)
                .put(update_property_handler)
                .delete(delete_property_handler),
        )
        .route("/api/contact", post(contact_handler))
        .route("/api/login", login)
        .route("/api/auth-check", get(auth_check_handler))
        .route("/api/health", get(health_handler))
        .layer(cors_layer(state.cors_origins.clone()))
        .layer(CompressionLayer::new());

    SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
