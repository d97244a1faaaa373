//! Aqueduct Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from a TOML file (`~/.config/aqueduct/config.toml`,
//! `/etc/aqueduct/config.toml`, or `./config.toml`), then overridden by
//! environment variables:
//!
//! - `AQUEDUCT_HOST`: Host to bind to (default: 0.0.0.0)
//! - `AQUEDUCT_PORT`: Port to listen on (default: 18080)
//! - `AQUEDUCT_MAX_BATCH_POINTS`: Per-request point cap (default: 10000)
//! - `AQUEDUCT_STORE_BACKEND`: `memory` or `remote` (default: memory)
//! - `AQUEDUCT_STORE_URL`: Remote store base URL
//! - `AQUEDUCT_STORE_TIMEOUT_MS`: Remote store request timeout
//! - `AQUEDUCT_LOG_LEVEL` / `AQUEDUCT_LOG_FORMAT`: Logging defaults
//! - `RUST_LOG`: Overrides the log filter entirely

use aqueduct::api::{serve, AppState};
use aqueduct::config::{Config, LoggingConfig, StoreBackend};
use aqueduct::store::{MemoryStore, RemoteStore, RemoteStoreConfig, TimeSeriesStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Aqueduct gateway v{}", env!("CARGO_PKG_VERSION"));

    let api_config = config.api_config();
    tracing::info!("Batch point cap: {}", api_config.max_batch_points);

    let store: Arc<dyn TimeSeriesStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store backend (volatile)");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Remote => {
            tracing::info!("Using remote store backend: {}", config.store.url);
            let remote = RemoteStore::new(RemoteStoreConfig {
                base_url: config.store.url.clone(),
                request_timeout_ms: config.store.request_timeout_ms,
            })?;

            match remote.health_check().await {
                Ok(()) => tracing::info!("Store connection verified"),
                Err(e) => tracing::warn!("Store not reachable yet: {}", e),
            }

            Arc::new(remote)
        }
    };

    let state = AppState::new(store, api_config.clone());

    tracing::info!("Starting server on {}", api_config.addr());
    serve(state, &api_config).await?;

    tracing::info!("Aqueduct gateway stopped");
    Ok(())
}

/// Initialize tracing from config, with `RUST_LOG` taking precedence.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "aqueduct={},tower_http=debug",
            logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
