//! Realty Catalog - real-estate listing service
//!
//! Binary entry point: loads configuration, connects the store and serves
//! the HTTP API until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use realty_catalog::auth::AuthService;
use realty_catalog::store::{MemoryStore, PropertyStore, StoreHealth};
use realty_catalog::{create_router, spawn_cache_sweep_task, AppState, CatalogService, Config};

/// Store selected at startup.
struct StoreSetup {
    store: Arc<dyn PropertyStore>,
    connected: bool,
    /// Process-local store that starts empty and is seeded from the fallback file
    in_memory: bool,
}

/// Main entry point for the catalog server.
///
/// # Startup Sequence
/// 1. Load `.env` and initialize the tracing subscriber
/// 2. Load configuration from environment variables
/// 3. Connect the store (or fall back to the in-memory store)
/// 4. Start the background cache sweep task
/// 5. Serve the router until a shutdown signal arrives
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realty_catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Realty Catalog server");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        cache_ttl_ms = config.cache_ttl_ms,
        max_page_size = config.max_page_size,
        fallback = %config.fallback_path.display(),
        environment = %config.environment,
        login_max_attempts = config.login_max_attempts,
        cors_origins = config.cors_origins.len(),
        "Configuration loaded"
    );

    let setup = connect_store(&config).await?;
    let catalog = CatalogService::from_config(setup.store, StoreHealth::new(setup.connected), &config);
    if setup.in_memory {
        match catalog.seed_from_fallback().await {
            Ok(added) => info!(added, "In-memory store ready"),
            Err(err) => warn!(error = %err, "Could not seed the in-memory store"),
        }
    }
    if !setup.connected {
        warn!("Store unreachable, serving reads from the static fallback");
    }

    let auth = AuthService::from_config(&config);

    let sweep_handle = spawn_cache_sweep_task(
        catalog.cache(),
        catalog.clock(),
        config.cache_sweep_interval,
    );
    info!("Background cache sweep task started");

    let app = create_router(AppState::from_config(catalog, auth, &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    // Peer addresses key the login rate limit
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(feature = "mongo")]
async fn connect_store(config: &Config) -> anyhow::Result<StoreSetup> {
    use realty_catalog::store::MongoStore;

    let Some(uri) = &config.mongo_uri else {
        return Ok(in_memory_store());
    };
    let store = MongoStore::connect(uri, &config.mongo_db)
        .await
        .context("invalid MONGO_URI")?;
    let connected = match store.ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "MongoDB ping failed");
            false
        }
    };
    Ok(StoreSetup {
        store: Arc::new(store),
        connected,
        in_memory: false,
    })
}

#[cfg(not(feature = "mongo"))]
async fn connect_store(config: &Config) -> anyhow::Result<StoreSetup> {
    if config.mongo_uri.is_some() {
        warn!("MONGO_URI is set but this build lacks the `mongo` feature");
    }
    Ok(in_memory_store())
}

fn in_memory_store() -> StoreSetup {
    info!("Using the in-memory property store");
    StoreSetup {
        store: Arc::new(MemoryStore::new()),
        connected: true,
        in_memory: true,
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweep_handle.abort();
    warn!("Cache sweep task aborted");
}
