//! Schema Validation
//!
//! Builds the request input mapping (decoded JSON body merged with
//! query-string and form arguments, JSON taking precedence) and extracts
//! the sanitized `timestamps`/`values` pair. No store interaction happens
//! here.

use serde_json::{Map, Value};

use super::ValidationError;

/// The sanitized two-key batch extracted from a request.
///
/// Elements are still heterogeneous JSON values; the normalizer owns the
/// type gates.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    pub timestamps: Vec<Value>,
    pub values: Vec<Value>,
}

impl RawBatch {
    /// Points submitted. The longer side counts until the length gate has
    /// run.
    pub fn len(&self) -> usize {
        self.timestamps.len().max(self.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Merge the decoded JSON body with query-string/form arguments.
///
/// JSON fields win; arguments only fill keys the body did not set.
pub fn merge_input(
    json_body: Option<Map<String, Value>>,
    args: &[(String, String)],
) -> Map<String, Value> {
    let mut input = json_body.unwrap_or_default();
    for (key, value) in args {
        if !input.contains_key(key) {
            input.insert(key.clone(), Value::String(value.clone()));
        }
    }
    input
}

/// Extract `timestamps` and `values` from the input mapping.
///
/// Both keys must be present or the batch is rejected wholesale. Sequence
/// fields pass through; string fields (query or form submissions) are
/// accepted when they hold a JSON array literal.
pub fn extract_batch(input: &Map<String, Value>) -> Result<RawBatch, ValidationError> {
    let timestamps = sequence_field(input, "timestamps")?;
    let values = sequence_field(input, "values")?;
    Ok(RawBatch { timestamps, values })
}

fn sequence_field(input: &Map<String, Value>, key: &str) -> Result<Vec<Value>, ValidationError> {
    match input.get(key) {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => Ok(items),
            _ => Err(ValidationError::InvalidSchema),
        },
        _ => Err(ValidationError::InvalidSchema),
    }
}

/// Decode an `application/x-www-form-urlencoded` body into key/value pairs.
pub fn decode_form(body: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(body);
    text.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|c| c.into_owned())
        .unwrap_or(spaced)
}
