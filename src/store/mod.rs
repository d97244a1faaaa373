//! Time-Series Store Abstraction
//!
//! The gateway does not implement storage itself. Every handler talks to a
//! store through the [`TimeSeriesStore`] trait, which models the four
//! primitives the upstream engine exposes: key creation, single-point
//! append, bounded range reads with bucket aggregation, and key-pattern
//! lookup.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process store for development and tests
//! - [`RemoteStore`]: HTTP client for an external store service

pub mod keys;
pub mod memory;
pub mod remote;

pub use keys::KeyLifecycle;
pub use memory::MemoryStore;
pub use remote::{RemoteStore, RemoteStoreConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store cannot be reached (connection refused, DNS failure, ...)
    #[error("store unreachable: {0}")]
    Unavailable(String),

    /// The store did not answer within the configured deadline
    #[error("store request timed out")]
    Timeout,

    /// The store answered with something this layer cannot interpret
    #[error("malformed store reply: {0}")]
    Protocol(String),

    /// The store rejected an operation on a key it does not know
    #[error("key not found: {0}")]
    KeyNotFound(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A single point as returned by a range read.
///
/// The value keeps its textual literal form so the query layer can type it
/// the way the store meant it: a literal without a decimal point is an
/// integer, anything else is floating point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPoint {
    /// Epoch seconds
    pub timestamp: i64,
    /// Value literal as produced by the store
    pub value: String,
}

impl RawPoint {
    pub fn new(timestamp: i64, value: impl Into<String>) -> Self {
        Self {
            timestamp,
            value: value.into(),
        }
    }
}

/// Aggregation function applied per bucket on range reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Avg,
    Sum,
    Min,
    Max,
    Count,
    First,
    Last,
}

impl Aggregation {
    /// Parse the wire form used in query strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "avg" | "average" => Some(Aggregation::Avg),
            "sum" => Some(Aggregation::Sum),
            "min" => Some(Aggregation::Min),
            "max" => Some(Aggregation::Max),
            "count" => Some(Aggregation::Count),
            "first" => Some(Aggregation::First),
            "last" => Some(Aggregation::Last),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Avg => "avg",
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Count => "count",
            Aggregation::First => "first",
            Aggregation::Last => "last",
        }
    }
}

/// The four primitives the gateway needs from a time-series store.
///
/// Implementations must be safe for concurrent use; one instance is shared
/// across all in-flight requests.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Create an empty series under `key`.
    async fn create_key(&self, key: &str) -> StoreResult<()>;

    /// Append one point to `key`.
    async fn add_point(&self, key: &str, timestamp: i64, value: f64) -> StoreResult<()>;

    /// Read `[start, end]` from `key`, reduced into `bucket_seconds`-wide
    /// buckets with `aggr`. Replies are time-ordered.
    async fn range_query(
        &self,
        key: &str,
        start: i64,
        end: i64,
        aggr: Aggregation,
        bucket_seconds: i64,
    ) -> StoreResult<Vec<RawPoint>>;

    /// All known keys containing `pattern` as a substring.
    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>>;
}
