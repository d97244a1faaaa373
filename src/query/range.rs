//! Range Query Shaping
//!
//! Issues one bounded, bucket-aggregated read against the store and
//! reshapes the reply into the parallel `timestamps`/`values` sequences
//! the wire format expects. Store order is preserved; this layer does not
//! re-sort.

use chrono::{Local, TimeZone, Utc};
use serde::Serialize;

use crate::store::{Aggregation, StoreError, StoreResult, TimeSeriesStore};

/// How result timestamps are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Epoch seconds (default)
    #[default]
    Timestamp,
    /// ISO-8601 local-time strings
    DateTime,
}

/// A bounded, optionally aggregated read of one series.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    pub key: String,
    pub start: i64,
    pub end: i64,
    pub aggr: Aggregation,
    pub bucket_seconds: i64,
    pub format: TimestampFormat,
}

impl RangeQuery {
    /// A query over `key` with the documented defaults: full history up to
    /// now, day-wide buckets, averaged, epoch timestamps.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            start: 0,
            end: Utc::now().timestamp(),
            aggr: Aggregation::Avg,
            bucket_seconds: 86_400,
            format: TimestampFormat::default(),
        }
    }
}

/// One result timestamp, epoch or ISO-8601 depending on the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultTimestamp {
    Epoch(i64),
    DateTime(String),
}

/// One result value, typed from the store literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    Int(i64),
    Float(f64),
}

/// Parallel, order-preserving reply sequences.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeResult {
    pub timestamps: Vec<ResultTimestamp>,
    pub values: Vec<ResultValue>,
    pub point_count: usize,
}

/// Run `query` against `store` and shape the reply.
pub async fn run(store: &dyn TimeSeriesStore, query: &RangeQuery) -> StoreResult<RangeResult> {
    let reply = store
        .range_query(
            &query.key,
            query.start,
            query.end,
            query.aggr,
            query.bucket_seconds,
        )
        .await?;

    let mut timestamps = Vec::with_capacity(reply.len());
    let mut values = Vec::with_capacity(reply.len());
    for point in reply {
        values.push(classify_value(&point.value)?);
        timestamps.push(render_timestamp(point.timestamp, query.format));
    }

    let point_count = values.len();
    Ok(RangeResult {
        timestamps,
        values,
        point_count,
    })
}

/// Type a value from its literal form: no decimal point means integer.
fn classify_value(literal: &str) -> StoreResult<ResultValue> {
    if !literal.contains('.') {
        if let Ok(n) = literal.parse::<i64>() {
            return Ok(ResultValue::Int(n));
        }
    }

    literal
        .parse::<f64>()
        .map(ResultValue::Float)
        .map_err(|_| StoreError::Protocol(format!("unparseable value literal '{}'", literal)))
}

fn render_timestamp(epoch: i64, format: TimestampFormat) -> ResultTimestamp {
    match format {
        TimestampFormat::Timestamp => ResultTimestamp::Epoch(epoch),
        TimestampFormat::DateTime => {
            let rendered = Local
                .timestamp_opt(epoch, 0)
                .single()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_else(|| epoch.to_string());
            ResultTimestamp::DateTime(rendered)
        }
    }
}
