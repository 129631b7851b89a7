use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError};

/// Inbound request as sent by Responses-style or Chat-style clients.
///
/// Every field is optional and loosely typed. A field carrying an unexpected
/// JSON type is treated as absent instead of failing the whole request.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundRequest {
    /// A plain string or an ordered list of content blocks / input messages.
    #[serde(default)]
    pub input: Option<serde_json::Value>,

    /// Chat-style messages; only the last element's string `content` is read.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub messages: Option<Vec<serde_json::Value>>,

    /// Legacy completion-style prompt.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub model: Option<String>,

    /// Raw tool entries in either declaration shape; normalised later.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub tools: Option<Vec<serde_json::Value>>,

    /// Forwarded verbatim.
    #[serde(default)]
    pub tool_choice: Option<serde_json::Value>,

    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Responses naming for the output token cap; preferred over `max_tokens`.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub max_output_tokens: Option<u32>,

    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// System prompt override.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub instructions: Option<String>,
}

impl InboundRequest {
    /// The caller-requested model, if it is a usable identifier.
    pub fn requested_model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}
