//! # Aqueduct
//!
//! A narrow REST gateway over a key-addressed time-series store: clients
//! POST timestamp/value pairs under a named series key and GET ranged,
//! optionally bucket-aggregated, slices back.
//!
//! The gateway owns request validation, normalization, and the
//! batch-write/range-query orchestration between the wire protocol and the
//! store. It does not implement storage or aggregation algorithms; the
//! store is an injected [`store::TimeSeriesStore`] capability.
//!
//! ## Modules
//!
//! - [`store`]: store trait plus the memory and remote backends
//! - [`ingest`]: schema, normalization, and batch-write pipeline
//! - [`query`]: range query shaping
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aqueduct::api::{serve, ApiConfig, AppState};
//! use aqueduct::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod ingest;
pub mod query;
pub mod store;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiConfig, ApiError, ApiResult, AppState, Envelope, Status};

pub use config::{Config, ConfigError, LoggingConfig, StoreBackend};

pub use ingest::{PointBatch, RawBatch, ValidationError, WriteOutcome};

pub use query::{RangeQuery, RangeResult, ResultTimestamp, ResultValue, TimestampFormat};

pub use store::{
    Aggregation, KeyLifecycle, MemoryStore, RawPoint, RemoteStore, RemoteStoreConfig, StoreError,
    StoreResult, TimeSeriesStore,
};
