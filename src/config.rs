//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Listing cache time-to-live in milliseconds
    pub cache_ttl_ms: u64,
    /// Interval in seconds between stale-snapshot sweeps
    pub cache_sweep_interval: u64,
    /// Page size used when `limit` is absent or unparsable
    pub default_page_size: u64,
    /// Upper bound for `limit`
    pub max_page_size: u64,
    /// Static fallback file read when the store is unavailable
    pub fallback_path: PathBuf,
    /// MongoDB connection string, if any
    pub mongo_uri: Option<String>,
    /// MongoDB database name
    pub mongo_db: String,
    /// HS256 signing secret; generated per process when unset
    pub jwt_secret: Option<String>,
    /// Token lifetime in seconds
    pub jwt_expiry_secs: i64,
    /// Seeded admin account
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub admin_email: String,
    /// Deployment label reported by the health endpoint
    pub environment: String,
    /// Login attempts allowed per client address within one window
    pub login_max_attempts: u32,
    /// Length of the login rate-limit window in seconds
    pub login_window_secs: u64,
    /// Allowed CORS origins: exact origins, or host suffixes starting with `.`
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Listing cache TTL in milliseconds (default: 60000)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `DEFAULT_PAGE_SIZE` - Default `limit` (default: 12)
    /// - `MAX_PROPERTIES_PER_PAGE` - Maximum `limit` (default: 50)
    /// - `FALLBACK_DATA_PATH` - Static fallback file (default: data/properties.json)
    /// - `MONGO_URI`, `MONGO_DB` - Document store connection
    /// - `JWT_SECRET`, `JWT_EXPIRY_SECS` - Token signing
    /// - `ADMIN_USERNAME`, `ADMIN_PASSWORD`, `ADMIN_EMAIL` - Admin account
    /// - `APP_ENV` - Deployment label (default: development)
    /// - `LOGIN_MAX_ATTEMPTS`, `LOGIN_WINDOW_SECS` - Login rate limit (default: 5 per 900s)
    /// - `CORS_ORIGINS` - Comma-separated origin allow-list (default depends on `APP_ENV`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let environment = non_empty_var("APP_ENV").unwrap_or(defaults.environment);
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_ttl_ms: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl_ms),
            cache_sweep_interval: parse_var("CACHE_SWEEP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cache_sweep_interval),
            default_page_size: parse_var("DEFAULT_PAGE_SIZE").unwrap_or(defaults.default_page_size),
            max_page_size: parse_var("MAX_PROPERTIES_PER_PAGE")
                .filter(|max| *max > 0)
                .unwrap_or(defaults.max_page_size),
            fallback_path: non_empty_var("FALLBACK_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fallback_path),
            mongo_uri: non_empty_var("MONGO_URI"),
            mongo_db: non_empty_var("MONGO_DB").unwrap_or(defaults.mongo_db),
            jwt_secret: non_empty_var("JWT_SECRET"),
            jwt_expiry_secs: parse_var("JWT_EXPIRY_SECS").unwrap_or(defaults.jwt_expiry_secs),
            admin_username: non_empty_var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            admin_email: non_empty_var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            login_max_attempts: parse_var("LOGIN_MAX_ATTEMPTS")
                .filter(|max| *max > 0)
                .unwrap_or(defaults.login_max_attempts),
            login_window_secs: parse_var("LOGIN_WINDOW_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.login_window_secs),
            cors_origins: non_empty_var("CORS_ORIGINS")
                .map(|list| split_list(&list))
                .unwrap_or_else(|| default_cors_origins(&environment)),
            environment,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Hosting platforms are always allowed; local dev servers only outside production.
fn default_cors_origins(environment: &str) -> Vec<String> {
    let mut origins = Vec::new();
    if environment != "production" {
        origins.extend(
            ["http://localhost:5000", "http://localhost:5001", "http://127.0.0.1:5000"]
                .map(String::from),
        );
    }
    origins.extend(
        [".vercel.app", ".vercel.dev", ".railway.app", ".onrender.com", ".replit.dev", ".replit.app"]
            .map(String::from),
    );
    origins
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_ttl_ms: 60_000,
            cache_sweep_interval: 30,
            default_page_size: 12,
            max_page_size: 50,
            fallback_path: PathBuf::from("data/properties.json"),
            mongo_uri: None,
            mongo_db: "realty".to_string(),
            jwt_secret: None,
            jwt_expiry_secs: 86_400,
            admin_username: "admin".to_string(),
            admin_password: None,
            admin_email: "admin@localhost".to_string(),
            environment: "development".to_string(),
            login_max_attempts: 5,
            login_window_secs: 15 * 60,
            cors_origins: default_cors_origins("development"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_ttl_ms, 60_000);
        assert_eq!(config.default_page_size, 12);
        assert_eq!(config.max_page_size, 50);
        assert!(config.mongo_uri.is_none());
        assert!(config.admin_password.is_none());
        assert_eq!(config.login_max_attempts, 5);
        assert_eq!(config.login_window_secs, 900);
        assert!(config.cors_origins.contains(&"http://localhost:5000".to_string()));
    }

    #[test]
    fn test_production_origins_drop_localhost() {
        let origins = default_cors_origins("production");
        assert!(origins.iter().all(|o| o.starts_with('.')));
        assert!(origins.contains(&".vercel.app".to_string()));
    }

    #[test]
    fn test_config_from_env_overrides_and_defaults() {
        // Single test touches the process environment to avoid races between tests
        env::set_var("CACHE_TTL", "1500");
        env::set_var("MAX_PROPERTIES_PER_PAGE", "not-a-number");
        env::set_var("MONGO_URI", "   ");
        env::remove_var("SERVER_PORT");
        env::remove_var("DEFAULT_PAGE_SIZE");
        env::set_var("CORS_ORIGINS", "https://a.example, .vercel.app ,");
        env::set_var("LOGIN_MAX_ATTEMPTS", "0");

        let config = Config::from_env();
        assert_eq!(config.cors_origins, ["https://a.example", ".vercel.app"]);
        assert_eq!(config.login_max_attempts, 5);
        assert_eq!(config.cache_ttl_ms, 1500);
        assert_eq!(config.max_page_size, 50);
        assert!(config.mongo_uri.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.default_page_size, 12);

        env::remove_var("CACHE_TTL");
        env::remove_var("MAX_PROPERTIES_PER_PAGE");
        env::remove_var("MONGO_URI");
        env::remove_var("CORS_ORIGINS");
        env::remove_var("LOGIN_MAX_ATTEMPTS");
    }
}
