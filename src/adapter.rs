use std::sync::Arc;

use crate::config::Config;
use crate::conversion::{build_upstream_payload, chat_to_responses, extract_user_text};
use crate::error::AdapterError;
use crate::models::chat::UpstreamPayload;
use crate::models::inbound::InboundRequest;
use crate::models::responses::OutboundResponse;
use crate::upstream::{complete_with_fallback, ChatUpstream, HttpUpstream};
use crate::util::build_http_client;

/// Translates one inbound request into upstream calls and back.
///
/// Holds only immutable configuration and the upstream handle, so one
/// instance serves every request.
pub struct Adapter {
    config: Arc<Config>,
    upstream: Arc<dyn ChatUpstream>,
}

/// A request ready to send: the payload for the first candidate and the full candidate list.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub payload: UpstreamPayload,
    pub candidates: Vec<String>,
}

impl Adapter {
    pub fn new(config: Arc<Config>, upstream: Arc<dyn ChatUpstream>) -> Self {
        Self { config, upstream }
    }

    /// Adapter talking to the configured provider over HTTP.
    pub fn from_config(config: Config) -> Self {
        let client = build_http_client(&config);
        let upstream = HttpUpstream::new(client, config.upstream_url.clone(), config.api_key.clone());
        Self::new(Arc::new(config), Arc::new(upstream))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract text, resolve candidates and build the upstream payload.
    pub fn prepare(&self, body: &InboundRequest) -> Result<PreparedRequest, AdapterError> {
        let user_text = extract_user_text(body, self.config.fallback_prompt.as_deref())
            .ok_or_else(|| {
                AdapterError::Validation(
                    "request has no usable text in input, messages or prompt".into(),
                )
            })?;

        let candidates = self.config.candidate_models(body.requested_model());
        let first = candidates.first().ok_or_else(|| {
            AdapterError::Configuration("no candidate models configured".into())
        })?;

        let payload = build_upstream_payload(
            body,
            &user_text,
            first,
            self.config.payload_defaults(),
        );
        Ok(PreparedRequest {
            payload,
            candidates,
        })
    }

    /// Full request/response cycle.
    ///
    /// The credential is checked before anything else so a misconfigured
    /// server never reaches the upstream.
    pub async fn respond(&self, body: &InboundRequest) -> Result<OutboundResponse, AdapterError> {
        self.config.require_api_key()?;
        let prepared = self.prepare(body)?;

        tracing::debug!(
            candidates = ?prepared.candidates,
            tools = prepared.payload.tools.as_ref().map(Vec::len).unwrap_or(0),
            max_tokens = prepared.payload.max_tokens,
            "forwarding request upstream"
        );

        let done = complete_with_fallback(
            self.upstream.as_ref(),
            &prepared.payload,
            &prepared.candidates,
        )
        .await?;

        chat_to_responses(&done.model, &done.reply.data)
    }
}
