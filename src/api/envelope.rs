//! Response Envelope
//!
//! Every request outcome, success or error, leaves through the same
//! `{status, message, data?}` wrapper. `status` is derived from the HTTP
//! code class alone. Serialized bodies escape `</` as `<\/` so a reply
//! embedded in a script context cannot close it.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// Envelope status classes, a pure function of the HTTP code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Redirect,
    Error,
    Fail,
}

impl Status {
    pub fn from_code(code: StatusCode) -> Self {
        match code.as_u16() {
            c if c < 300 => Status::Success,
            c if c < 400 => Status::Redirect,
            c if c < 500 => Status::Error,
            _ => Status::Fail,
        }
    }
}

/// The uniform response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn new(code: StatusCode, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: Status::from_code(code),
            message: message.into(),
            data,
        }
    }

    /// Serialize with the `</` escape applied.
    pub fn to_body(&self) -> String {
        let body = serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "envelope serialization failed");
            r#"{"status":"fail","message":"response serialization failed"}"#.to_string()
        });
        body.replace("</", "<\\/")
    }
}

/// Build the HTTP response for `code`, with optional extra headers.
///
/// This is the single exit point for every request outcome.
pub fn respond(
    code: StatusCode,
    message: impl Into<String>,
    data: Option<Value>,
    extra_headers: Option<HeaderMap>,
) -> Response {
    let envelope = Envelope::new(code, message, data);
    let mut response = (
        code,
        [(header::CONTENT_TYPE, "application/json; charset=UTF-8")],
        envelope.to_body(),
    )
        .into_response();

    if let Some(headers) = extra_headers {
        response.headers_mut().extend(headers);
    }

    response
}
