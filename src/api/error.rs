//! API Error Types
//!
//! Maps every failure the gateway can produce onto the response envelope
//! with the right status code. Client mistakes are 4xx `error` envelopes;
//! store unavailability is a 5xx `fail` envelope, never a crashed handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::envelope;
use crate::ingest::ValidationError;
use crate::store::StoreError;

/// API error taxonomy
#[derive(Error, Debug)]
pub enum ApiError {
    /// One of the ingest gates rejected the batch
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Body could not be parsed at all
    #[error("Failed to parse input data. It must be sent with header Content-Type: application/json and JSON serialized.")]
    MalformedBody,

    /// Request under /tsdb/ without a usable series key
    #[error("TS key required")]
    MissingKey,

    /// GET against a series that does not exist
    #[error("Time series key not found.")]
    KeyNotFound,

    /// A query parameter failed to parse
    #[error("Invalid query parameter {name}: '{value}'")]
    InvalidParameter { name: &'static str, value: String },

    /// Unknown aggregation function
    #[error("Invalid aggregation '{0}'. Use avg, sum, min, max, count, first, or last.")]
    InvalidAggregation(String),

    /// The store failed underneath a request
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::MalformedBody
            | ApiError::MissingKey
            | ApiError::InvalidParameter { .. }
            | ApiError::InvalidAggregation(_) => StatusCode::BAD_REQUEST,
            ApiError::KeyNotFound => StatusCode::NOT_FOUND,
            ApiError::Store(e) => match e {
                StoreError::Unavailable(_) | StoreError::Timeout => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                StoreError::Protocol(_) => StatusCode::BAD_GATEWAY,
                StoreError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            },
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if code.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                status = %code,
                error = %self,
                "request failed"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                status = %code,
                error = %self,
                "request rejected"
            );
        }

        envelope::respond(code, self.to_string(), None, None)
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
