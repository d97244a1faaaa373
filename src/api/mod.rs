//! Aqueduct REST API
//!
//! HTTP layer for the gateway, built with Axum.
//!
//! # Endpoints
//!
//! ## Time series
//! - `POST /tsdb/:key` - write a batch of timestamp/value pairs
//! - `GET /tsdb/:key` - ranged, optionally aggregated read
//! - anything else under `/tsdb/` - 400, the series key is required
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use aqueduct::api::{build_router, serve, ApiConfig, AppState};
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

pub mod dto;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod state;

pub use envelope::{Envelope, Status};
pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.max_body_size;

    let tsdb_routes = Router::new()
        .route(
            "/:key",
            post(routes::tsdb::ingest)
                .get(routes::tsdb::query_range)
                .fallback(routes::tsdb::missing_key),
        )
        .route(
            "/:key/",
            post(routes::tsdb::ingest)
                .get(routes::tsdb::query_range)
                .fallback(routes::tsdb::missing_key),
        )
        // every other path/method combination under /tsdb/
        .fallback(routes::tsdb::missing_key);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/tsdb", tsdb_routes)
        .nest("/health", health_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Aqueduct API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Aqueduct API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn test_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        build_router(AppState::new(store, ApiConfig::default()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_post_batch_created() {
        let app = test_app();

        let response = app
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [1_700_000_000, 1_700_000_060], "values": [1.5, 2.5] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["successCount"], 2);
        assert_eq!(body["data"]["failureCount"], 0);
    }

    #[tokio::test]
    async fn test_post_empty_batch_is_plain_ok() {
        let app = test_app();

        let response = app
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [], "values": [] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["successCount"], 0);
        assert_eq!(body["data"]["failureCount"], 0);
    }

    #[tokio::test]
    async fn test_post_length_mismatch_rejected_before_write() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [1, 2], "values": [1] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert!(body.get("data").is_none());

        // the rejected batch must not have created the key
        let response = app.oneshot(get("/tsdb/k1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_missing_schema() {
        let app = test_app();

        let response = app
            .oneshot(post_json("/tsdb/k1", json!({ "values": [1] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid schema submitted.");
    }

    #[tokio::test]
    async fn test_post_malformed_json() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tsdb/k1")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_oversized_batch() {
        let store = Arc::new(MemoryStore::new());
        let config = ApiConfig {
            max_batch_points: 2,
            ..Default::default()
        };
        let app = build_router(AppState::new(store, config));

        let response = app
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [1, 2, 3], "values": [1, 2, 3] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Batch exceeds the maximum of 2 points.");
    }

    #[tokio::test]
    async fn test_round_trip_integer_value() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [1_700_000_000], "values": [42] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(get(
                "/tsdb/k1?start=1699999999&end=1700000001&aggr_secs=1",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Points found for k1.");
        assert_eq!(body["data"]["timestamps"][0], 1_700_000_000_i64);
        assert_eq!(body["data"]["values"][0], 42);
        assert!(body["data"]["values"][0].is_i64());
        assert_eq!(body["data"]["pointCount"], 1);
    }

    #[tokio::test]
    async fn test_round_trip_float_value() {
        let app = test_app();

        app.clone()
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [1_700_000_000], "values": [3.5] }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get("/tsdb/k1?start=0&end=1700000001&aggr_secs=1"))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert!(body["data"]["values"][0].is_f64());
        assert_eq!(body["data"]["values"][0], 3.5);
    }

    #[tokio::test]
    async fn test_post_iso_timestamps_round_trip() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": ["2023-11-14T22:13:20+00:00"], "values": [7] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(get(
                "/tsdb/k1?start=1699999999&end=1700000001&aggr_secs=1",
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["data"]["timestamps"][0], 1_700_000_000_i64);
    }

    #[tokio::test]
    async fn test_get_unknown_key_is_404_without_data() {
        let app = test_app();

        let response = app.oneshot(get("/tsdb/ghost")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Time series key not found.");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_get_datetime_timestamps() {
        let app = test_app();

        app.clone()
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [1_700_000_000], "values": [42] }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get("/tsdb/k1?tstype=datetime&aggr_secs=1"))
            .await
            .unwrap();

        let body = body_json(response).await;
        let rendered = body["data"]["timestamps"][0].as_str().unwrap();
        assert!(rendered.starts_with("202"));
        assert!(rendered.contains('T'));
        // values stay numeric
        assert!(body["data"]["values"][0].is_i64());
    }

    #[tokio::test]
    async fn test_get_unknown_aggregation() {
        let app = test_app();

        app.clone()
            .oneshot(post_json(
                "/tsdb/k1",
                json!({ "timestamps": [1], "values": [1] }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get("/tsdb/k1?aggr_func=median"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tsdb_without_key_is_400() {
        for request in [
            get("/tsdb"),
            get("/tsdb/"),
            post_json("/tsdb", json!({})),
            get("/tsdb/a/b"),
        ] {
            let response = test_app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response).await;
            assert_eq!(body["message"], "TS key required");
        }
    }

    #[tokio::test]
    async fn test_unsupported_method_is_400() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/tsdb/k1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_responses_are_json_utf8() {
        let app = test_app();

        let response = app.oneshot(get("/tsdb/ghost")).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::CONTENT_TYPE)
                .unwrap(),
            "application/json; charset=UTF-8"
        );
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = test_app();

        let response = app.oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = test_app();

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "ok");
    }
}
