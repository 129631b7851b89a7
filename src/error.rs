use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::util::error_response;

/// Everything that can end a request/response cycle early.
///
/// Retryable model errors are not represented here: the fallback loop
/// absorbs them and only surfaces `AllCandidatesFailed` once the list runs out.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Required server-side setting missing (e.g. the upstream credential).
    #[error("{0}")]
    Configuration(String),

    /// The inbound body cannot be turned into an upstream call.
    #[error("{0}")]
    Validation(String),

    /// Body refused before it could be read as a request, e.g. not JSON or over the size limit.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// Non-retryable non-2xx answer from the upstream.
    #[error("upstream request failed with status {status}: {}", upstream_message(.body))]
    Upstream { status: u16, body: Value },

    /// Every candidate model was rejected as unavailable.
    #[error("all candidate models failed: {}", .attempted.join(", "))]
    AllCandidatesFailed {
        attempted: Vec<String>,
        last_status: u16,
        last_error: Value,
    },

    /// Transport, parse or other unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdapterError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdapterError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdapterError::Validation(_) => StatusCode::BAD_REQUEST,
            AdapterError::Rejected { status, .. } => *status,
            AdapterError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AdapterError::AllCandidatesFailed { .. } => StatusCode::BAD_GATEWAY,
            AdapterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured payload placed under `error.details`.
    pub fn details(&self) -> Option<Value> {
        match self {
            AdapterError::Upstream { body, .. } => Some(body.clone()),
            AdapterError::AllCandidatesFailed {
                attempted,
                last_status,
                last_error,
            } => Some(json!({
                "attempted": attempted,
                "last_status": last_status,
                "last_error": last_error,
            })),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        AdapterError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for AdapterError {
    fn from(e: JsonRejection) -> Self {
        AdapterError::Rejected {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        error_response(status, &self.to_string(), self.details())
    }
}

/// Best-effort human message out of an upstream error body.
fn upstream_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(s)) => s.clone(),
        Some(err) => err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
        None => "unknown error".to_string(),
    }
}
