//! Upstream Chat Completions calls and the model fallback loop.

use async_trait::async_trait;
use http::header;
use serde_json::{Map, Value};

use crate::error::AdapterError;
use crate::models::chat::UpstreamPayload;

/// Error codes that mean "this model is gone, try another one".
const MODEL_UNAVAILABLE_CODES: &[&str] = &["model_decommissioned", "model_not_found"];

/// Message fragments with the same meaning, matched case-insensitively.
const MODEL_UNAVAILABLE_HINTS: &[&str] = &["decommissioned", "no longer supported", "does not exist"];

/// Outcome of one upstream call.
///
/// A non-2xx answer is an ordinary reply, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub ok: bool,
    pub status: u16,
    /// Parsed JSON body, or an empty object when the body was not JSON.
    pub data: Value,
}

impl UpstreamReply {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status,
            data,
        }
    }
}

/// Something that can take a chat payload and answer it.
#[async_trait]
pub trait ChatUpstream: Send + Sync {
    async fn call(&self, payload: &UpstreamPayload) -> Result<UpstreamReply, AdapterError>;
}

/// reqwest-backed upstream posting to a fixed chat-completions URL.
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpUpstream {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl ChatUpstream for HttpUpstream {
    async fn call(&self, payload: &UpstreamPayload) -> Result<UpstreamReply, AdapterError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AdapterError::Configuration("upstream API key not set".into()))?;

        let resp = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(key)
            .json(payload)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        let data = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|e| {
            tracing::debug!(status, error = %e, len = bytes.len(), "upstream body is not JSON");
            Value::Object(Map::new())
        });

        Ok(UpstreamReply::new(status, data))
    }
}

/// True when an upstream error body says the requested model is unavailable.
pub fn is_retryable_model_error(data: &Value) -> bool {
    let Some(err) = data.get("error") else {
        return false;
    };

    if let Some(code) = err.get("code").and_then(Value::as_str) {
        if MODEL_UNAVAILABLE_CODES.contains(&code) {
            return true;
        }
    }

    let message = match err {
        Value::String(s) => Some(s.as_str()),
        other => other.get("message").and_then(Value::as_str),
    };
    message
        .map(|m| {
            let m = m.to_lowercase();
            MODEL_UNAVAILABLE_HINTS.iter().any(|hint| m.contains(hint))
        })
        .unwrap_or(false)
}

/// Successful result of the fallback loop.
#[derive(Debug, Clone)]
pub struct FallbackSuccess {
    /// Model that produced the answer.
    pub model: String,
    pub reply: UpstreamReply,
    /// Models rejected as unavailable before `model` succeeded.
    pub attempted: Vec<String>,
}

/// Try each candidate in order until one answers.
///
/// A model-unavailable error moves on to the next candidate; any other
/// failure is returned at once without touching the remaining models.
pub async fn complete_with_fallback(
    upstream: &dyn ChatUpstream,
    payload: &UpstreamPayload,
    candidates: &[String],
) -> Result<FallbackSuccess, AdapterError> {
    if candidates.is_empty() {
        return Err(AdapterError::Configuration(
            "no candidate models configured".into(),
        ));
    }

    let mut attempted: Vec<String> = Vec::new();
    let mut last: Option<UpstreamReply> = None;

    for model in candidates {
        let reply = upstream.call(&payload.with_model(model)).await?;

        if reply.ok {
            if !attempted.is_empty() {
                tracing::info!(model = %model, skipped = ?attempted, "fallback model succeeded");
            }
            return Ok(FallbackSuccess {
                model: model.clone(),
                reply,
                attempted,
            });
        }

        if !is_retryable_model_error(&reply.data) {
            tracing::error!(model = %model, status = reply.status, "upstream returned terminal error");
            return Err(AdapterError::Upstream {
                status: reply.status,
                body: reply.data,
            });
        }

        tracing::warn!(model = %model, status = reply.status, "model unavailable, trying next candidate");
        attempted.push(model.clone());
        last = Some(reply);
    }

    let (last_status, last_error) = last
        .map(|r| (r.status, r.data))
        .unwrap_or((0, Value::Null));
    Err(AdapterError::AllCandidatesFailed {
        attempted,
        last_status,
        last_error,
    })
}
