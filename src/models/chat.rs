use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::tools::ToolDeclaration;

/// Chat Completions role enumeration.
///
/// Uses lowercase serialization to match the Chat API:
/// "system" | "user" | "assistant" | "tool"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Text-only chat message sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of the upstream `POST .../chat/completions` call.
///
/// Tools are always in the nested Chat shape by the time they land here.
/// Null/None fields are omitted during serialization.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Option<Vec<ToolDeclaration>>,
    pub tool_choice: Option<serde_json::Value>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl UpstreamPayload {
    /// Same payload addressed to another model.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }
}

// ============================================================================
// Chat Completions Response Models
// ============================================================================
//
// Every field defaults so that partial or provider-specific bodies still parse.

/// Tool call in a Chat Completions response
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub call_type: Option<String>, // "function"
    #[serde(default)]
    pub function: FunctionCall,
}

/// Function call details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: String, // JSON string
}

/// Message in a Chat Completions response
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: Option<String>, // "assistant"
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Choice in a Chat Completions response
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<ChatResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>, // "stop", "length", "tool_calls", "content_filter"
}

/// Usage statistics in Chat Completions response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Chat Completions API response
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatCompletionResponse {
    /// First choice's message, if any.
    pub fn first_message(&self) -> Option<&ChatResponseMessage> {
        self.choices.first().and_then(|c| c.message.as_ref())
    }
}
