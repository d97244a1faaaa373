//! Application State
//!
//! Shared state accessible by all API handlers. The store is an injected
//! capability, wrapped in Arc for thread-safe sharing across async tasks;
//! nothing here is ambient or global.

use std::sync::Arc;
use std::time::Instant;

use crate::store::TimeSeriesStore;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Injected time-series store
    pub store: Arc<dyn TimeSeriesStore>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn TimeSeriesStore>, config: ApiConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Maximum points accepted in one batch write
    pub max_batch_points: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 18080,
            max_body_size: 10 * 1024 * 1024, // 10MB
            max_batch_points: 10_000,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
