//! Remote Store Client
//!
//! HTTP client for an upstream time-series store service. This is the
//! backend used when the gateway fronts a real store; the wire protocol is
//! a small JSON REST surface mirroring the four store primitives.
//!
//! Transport failures are mapped onto [`StoreError`] so handlers can tell
//! "key absent" apart from "store unreachable".

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{Aggregation, RawPoint, StoreError, StoreResult, TimeSeriesStore};

/// Configuration for the remote store client
#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    /// Base URL of the store service (e.g. "http://localhost:6380")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6380".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

/// Client for a remote time-series store.
pub struct RemoteStore {
    client: Client,
    config: RemoteStoreConfig,
}

impl RemoteStore {
    /// Create a new client with the given configuration.
    pub fn new(config: RemoteStoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteStoreConfig {
        &self.config
    }

    /// Check that the store answers at all.
    pub async fn health_check(&self) -> StoreResult<()> {
        let url = self.url("/health");
        let response = self.client.get(&url).send().await.map_err(map_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "health endpoint returned {}",
                response.status()
            )))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn key_url(&self, prefix: &str, key: &str, suffix: &str) -> String {
        self.url(&format!("{}{}{}", prefix, urlencoding::encode(key), suffix))
    }
}

fn map_transport(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else if e.is_connect() {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Protocol(e.to_string())
    }
}

fn check_status(response: reqwest::Response, key: &str) -> StoreResult<reqwest::Response> {
    match response.status() {
        s if s.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(StoreError::KeyNotFound(key.to_string())),
        s if s.is_server_error() => Err(StoreError::Unavailable(format!("store answered {}", s))),
        s => Err(StoreError::Protocol(format!("store answered {}", s))),
    }
}

/// One point in a range reply. The store sends the value as a bare JSON
/// number whose literal form decides the client-facing type.
#[derive(Debug, Deserialize)]
struct WirePoint {
    timestamp: i64,
    value: Value,
}

/// Extract the textual literal from a wire value, preserving its form.
fn literal_from(value: Value) -> StoreResult<String> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(StoreError::Protocol(format!(
            "unexpected value in range reply: {}",
            other
        ))),
    }
}

#[async_trait]
impl TimeSeriesStore for RemoteStore {
    async fn create_key(&self, key: &str) -> StoreResult<()> {
        let url = self.key_url("/keys/", key, "");
        let response = self.client.post(&url).send().await.map_err(map_transport)?;
        check_status(response, key)?;
        Ok(())
    }

    async fn add_point(&self, key: &str, timestamp: i64, value: f64) -> StoreResult<()> {
        let url = self.key_url("/series/", key, "/points");
        let body = serde_json::json!({ "timestamp": timestamp, "value": value });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;
        check_status(response, key)?;
        Ok(())
    }

    async fn range_query(
        &self,
        key: &str,
        start: i64,
        end: i64,
        aggr: Aggregation,
        bucket_seconds: i64,
    ) -> StoreResult<Vec<RawPoint>> {
        let url = self.key_url("/series/", key, "/range");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("aggr", aggr.as_str().to_string()),
                ("bucket", bucket_seconds.to_string()),
            ])
            .send()
            .await
            .map_err(map_transport)?;
        let response = check_status(response, key)?;

        let points: Vec<WirePoint> = response
            .json()
            .await
            .map_err(|e| StoreError::Protocol(e.to_string()))?;

        points
            .into_iter()
            .map(|p| Ok(RawPoint::new(p.timestamp, literal_from(p.value)?)))
            .collect()
    }

    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let url = self.url("/keys");
        let response = self
            .client
            .get(&url)
            .query(&[("pattern", pattern)])
            .send()
            .await
            .map_err(map_transport)?;
        let response = check_status(response, pattern)?;

        response
            .json()
            .await
            .map_err(|e| StoreError::Protocol(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let store = RemoteStore::new(RemoteStoreConfig {
            base_url: "http://store:6380/".to_string(),
            request_timeout_ms: 1000,
        })
        .unwrap();

        assert_eq!(store.url("/health"), "http://store:6380/health");
        assert_eq!(
            store.key_url("/series/", "k 1", "/range"),
            "http://store:6380/series/k%201/range"
        );
    }

    #[test]
    fn test_literal_preserves_number_form() {
        let int: Value = serde_json::from_str("42").unwrap();
        assert_eq!(literal_from(int).unwrap(), "42");

        let float: Value = serde_json::from_str("3.5").unwrap();
        assert_eq!(literal_from(float).unwrap(), "3.5");

        let text: Value = serde_json::from_str("\"7.25\"").unwrap();
        assert_eq!(literal_from(text).unwrap(), "7.25");
    }

    #[test]
    fn test_literal_rejects_non_scalar() {
        let arr: Value = serde_json::from_str("[1,2]").unwrap();
        assert!(matches!(
            literal_from(arr),
            Err(StoreError::Protocol(_))
        ));
    }
}
