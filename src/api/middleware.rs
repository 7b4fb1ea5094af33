//! HTTP middleware
//!
//! Login rate limiting, the CORS allow-list and the security response
//! headers applied to every route.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use url::Url;

use crate::cache::{Clock, SystemClock};
use crate::config::Config;
use crate::error::ApiError;

pub const LOGIN_LIMIT_MESSAGE: &str =
    "Demasiados intentos de login. Intenta nuevamente en 15 minutos.";

/// Pagination headers readable by browser clients.
const EXPOSED_HEADERS: [&str; 4] = ["x-total-count", "x-page", "x-limit", "x-total-pages"];

/// Set on every response unless the handler already set them.
pub const SECURITY_HEADERS: [(&str, &str); 11] = [
    (
        "content-security-policy",
        "default-src 'self'; style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
         font-src 'self' https://fonts.gstatic.com; img-src 'self' data: https: http:; \
         script-src 'self'; connect-src 'self'; base-uri 'self'; form-action 'self'; \
         frame-ancestors 'self'; object-src 'none'",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

// == Login Limiter ==
#[derive(Debug, Clone, Copy)]
struct Window {
    started_ms: u64,
    attempts: u32,
}

/// Fixed-window attempt counter keyed by client address.
pub struct LoginLimiter {
    max_attempts: u32,
    window_ms: u64,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl LoginLimiter {
    pub fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window_ms: window_secs.saturating_mul(1000),
            clock: Arc::new(SystemClock),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.login_max_attempts, config.login_window_secs)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Counts an attempt for `key`. Returns the seconds until the window
    /// resets when the attempt is over the limit.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = self.clock.now_ms();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Expired windows are dropped so the map only holds active clients
        windows.retain(|_, w| now.saturating_sub(w.started_ms) < self.window_ms);

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_ms: now,
            attempts: 0,
        });
        if window.attempts >= self.max_attempts {
            let remaining_ms = (window.started_ms + self.window_ms).saturating_sub(now);
            return Err(remaining_ms.div_ceil(1000));
        }
        window.attempts += 1;
        Ok(())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .map(|w| w.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

impl Default for LoginLimiter {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl std::fmt::Debug for LoginLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginLimiter")
            .field("max_attempts", &self.max_attempts)
            .field("window_ms", &self.window_ms)
            .finish_non_exhaustive()
    }
}

/// Rejects login attempts over the limit with 429 and `Retry-After`.
///
/// Clients are keyed by peer address; requests without connection info
/// share one bucket.
pub async fn login_rate_limit(
    State(limiter): State<Arc<LoginLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(client = %client, retry_after, "Login rate limit exceeded");
            let mut response =
                ApiError::TooManyRequests(LOGIN_LIMIT_MESSAGE.to_string()).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

// == CORS ==
/// True when `origin` is listed exactly or its host ends with a listed
/// `.suffix`.
pub fn origin_allowed(allowed: &[String], origin: &str) -> bool {
    let host = Url::parse(origin).ok().and_then(|url| url.host_str().map(str::to_string));
    allowed.iter().any(|entry| {
        if entry.starts_with('.') {
            host.as_deref().is_some_and(|host| host.ends_with(entry.as_str()))
        } else {
            entry == origin
        }
    })
}

/// Credentialed CORS restricted to the configured origins.
pub fn cors_layer(allowed: Vec<String>) -> CorsLayer {
    let allowed = Arc::new(allowed);
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|origin| origin_allowed(&allowed, origin))
        }))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers(EXPOSED_HEADERS.map(HeaderName::from_static))
}
