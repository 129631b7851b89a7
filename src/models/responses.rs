use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

// ============================================================================
// Responses API Response Models
// ============================================================================

/// Content part inside an output message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputContent {
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<serde_json::Value>,
    },
}

/// Output item types returned to Responses callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        id: String,
        role: String,
        status: String,
        content: Vec<OutputContent>,
    },
    FunctionCall {
        id: String,
        call_id: String,
        name: String,
        arguments: String,
        status: String,
    },
}

/// Usage statistics in Responses naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsesUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Complete Responses-shaped reply
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundResponse {
    pub id: String,
    pub object: String, // "response"
    pub created: u64,
    pub model: String,
    pub status: String, // "completed"

    /// Message first, then any function calls.
    pub output: Vec<OutputItem>,

    /// Primary text output (convenience field)
    #[serde(default)]
    pub output_text: Option<String>,

    #[serde(default)]
    pub usage: Option<ResponsesUsage>,
}
