//! Timestamp and Value Normalization
//!
//! Coerces heterogeneous timestamp representations into whole epoch
//! seconds and enforces the numeric and length gates, in order:
//!
//! 1. textual timestamps parse as ISO-8601 or the batch is rejected
//! 2. every timestamp must be numeric
//! 3. every value must be numeric
//! 4. both sequences must have equal length
//!
//! Each failure short-circuits the remainder; a batch is never partially
//! normalized.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

use super::{RawBatch, ValidationError};

/// A fully normalized batch, ready for the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct PointBatch {
    /// Whole epoch seconds
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

impl PointBatch {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Run the gates over a raw batch.
pub fn normalize(raw: &RawBatch) -> Result<PointBatch, ValidationError> {
    // Gate 1: convert textual timestamps. A numeric gate failure must not
    // mask a conversion failure later in the sequence, so non-numeric
    // leftovers are only rejected once every string has parsed.
    let mut converted: Vec<Option<i64>> = Vec::with_capacity(raw.timestamps.len());
    for element in &raw.timestamps {
        match element {
            Value::String(text) => match parse_iso8601(text) {
                Some(epoch) => converted.push(Some(epoch)),
                None => return Err(ValidationError::TimestampConversion),
            },
            // fractional seconds truncate toward zero
            Value::Number(n) => {
                converted.push(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
            }
            _ => converted.push(None),
        }
    }

    // Gate 2: every timestamp is numeric
    let timestamps: Vec<i64> = converted
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or(ValidationError::InvalidTimestamps)?;

    // Gate 3: every value is numeric
    let mut values = Vec::with_capacity(raw.values.len());
    for element in &raw.values {
        match element.as_f64() {
            Some(value) => values.push(value),
            None => return Err(ValidationError::InvalidValues),
        }
    }

    // Gate 4: parallel sequences line up
    if timestamps.len() != values.len() {
        return Err(ValidationError::LengthMismatch);
    }

    Ok(PointBatch { timestamps, values })
}

/// Parse an ISO-8601 date-time into epoch seconds.
///
/// Offset-aware strings convert directly; naive strings are read as local
/// time, matching how result timestamps are rendered back on
/// `tstype=datetime` queries. Fractional seconds truncate.
pub fn parse_iso8601(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return local_epoch(naive);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return local_epoch(date.and_hms_opt(0, 0, 0)?);
    }

    None
}

fn local_epoch(naive: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp())
}
