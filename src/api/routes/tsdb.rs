//! Time-Series Routes
//!
//! The single resource family the gateway exposes.
//!
//! - POST /tsdb/:key - write a batch of timestamp/value pairs
//! - GET /tsdb/:key - ranged, optionally bucket-aggregated read
//!
//! Anything else under /tsdb/ is a 400: the series key is the resource.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::api::dto::RangeParams;
use crate::api::envelope;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::ingest::{normalize, schema, writer, ValidationError};
use crate::query::range::{self, RangeQuery, TimestampFormat};
use crate::store::{Aggregation, KeyLifecycle};

/// POST /tsdb/:key
///
/// Validate, normalize, and write a batch of points. Any partial success
/// is a 201; a batch with zero writes (including an empty batch) is a 200.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(args): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    if key.is_empty() {
        return Err(ApiError::MissingKey);
    }

    let input = build_input(&headers, &body, &args)?;
    let raw = schema::extract_batch(&input)?;

    if raw.len() > state.config.max_batch_points {
        return Err(ValidationError::BatchTooLarge {
            limit: state.config.max_batch_points,
        }
        .into());
    }

    let batch = normalize::normalize(&raw)?;

    let keys = KeyLifecycle::new(state.store.as_ref());
    keys.ensure(&key).await?;

    let outcome = writer::write_batch(state.store.as_ref(), &key, &batch).await;
    tracing::info!(
        key = %key,
        success = outcome.success_count,
        failures = outcome.failure_count,
        "batch write finished"
    );

    let code = if outcome.any_written() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let data = serde_json::to_value(outcome).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(envelope::respond(
        code,
        "Points accepted to be added",
        Some(data),
        None,
    ))
}

/// GET /tsdb/:key
///
/// Bounded, optionally aggregated read of one series. 404 when the key
/// names no existing series.
pub async fn query_range(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Response> {
    if key.is_empty() {
        return Err(ApiError::MissingKey);
    }

    let keys = KeyLifecycle::new(state.store.as_ref());
    if !keys.exists(&key).await? {
        tracing::debug!(key = %key, "range query for unknown series");
        return Err(ApiError::KeyNotFound);
    }

    let query = build_range_query(&key, &params)?;
    let result = range::run(state.store.as_ref(), &query).await?;

    let data = serde_json::to_value(&result).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(envelope::respond(
        StatusCode::OK,
        format!("Points found for {}.", key),
        Some(data),
        None,
    ))
}

/// Catch-all under /tsdb/: every other path or method needs a series key.
pub async fn missing_key() -> ApiError {
    ApiError::MissingKey
}

/// Assemble the merged input mapping: decoded JSON body first, then
/// query-string and form arguments for keys the body did not provide.
fn build_input(
    headers: &HeaderMap,
    body: &Bytes,
    query_args: &[(String, String)],
) -> ApiResult<Map<String, Value>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let json_body = if content_type.starts_with("application/json") && !body.is_empty() {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Some(map),
            _ => return Err(ApiError::MalformedBody),
        }
    } else {
        None
    };

    let mut args: Vec<(String, String)> = query_args.to_vec();
    if content_type.starts_with("application/x-www-form-urlencoded") && !body.is_empty() {
        args.extend(schema::decode_form(body));
    }

    Ok(schema::merge_input(json_body, &args))
}

fn build_range_query(key: &str, params: &RangeParams) -> ApiResult<RangeQuery> {
    let mut query = RangeQuery::new(key);

    if let Some(start) = &params.start {
        query.start = parse_int("start", start)?;
    }
    if let Some(end) = &params.end {
        query.end = parse_int("end", end)?;
    }
    if let Some(aggr) = &params.aggr_func {
        query.aggr = Aggregation::parse(aggr)
            .ok_or_else(|| ApiError::InvalidAggregation(aggr.clone()))?;
    }
    if let Some(secs) = &params.aggr_secs {
        query.bucket_seconds = parse_int("aggr_secs", secs)?;
    }
    if params
        .tstype
        .as_deref()
        .is_some_and(|t| t.contains("datetime"))
    {
        query.format = TimestampFormat::DateTime;
    }

    Ok(query)
}

fn parse_int(name: &'static str, value: &str) -> ApiResult<i64> {
    value.parse().map_err(|_| ApiError::InvalidParameter {
        name,
        value: value.to_string(),
    })
}
