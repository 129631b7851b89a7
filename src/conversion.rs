use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AdapterError;
use crate::models::chat::{ChatCompletionResponse, ChatMessage, ChatUsage, UpstreamPayload};
use crate::models::inbound::InboundRequest;
use crate::models::responses::{OutboundResponse, OutputContent, OutputItem, ResponsesUsage};
use crate::models::tools::{ToolDeclaration, ToolForm};

/// Server-side defaults applied when the inbound body leaves a field unset.
#[derive(Debug, Clone, Copy)]
pub struct PayloadDefaults<'a> {
    pub system_prompt: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Coerce raw tool entries into one declaration shape.
///
/// Entries already in `target` pass through, the other shape is re-wrapped,
/// and anything without a usable function name is dropped.
pub fn normalize_tools(tools: &[Value], target: ToolForm) -> Vec<ToolDeclaration> {
    tools
        .iter()
        .filter_map(|raw| {
            let decl = ToolDeclaration::from_value(raw);
            if decl.is_none() {
                tracing::debug!(tool = %raw, "dropping malformed tool declaration");
            }
            decl
        })
        .map(|decl| decl.to_form(target))
        .collect()
}

/// Pick the user's message out of the inbound body.
///
/// Priority, first match wins:
/// 1. `input` as a non-empty string, verbatim
/// 2. `input` as a list, text of every element joined by newlines and trimmed
/// 3. string `content` of the last element of `messages`
/// 4. `prompt`
/// 5. `fallback`
pub fn extract_user_text(body: &InboundRequest, fallback: Option<&str>) -> Option<String> {
    match &body.input {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .flat_map(input_item_texts)
                .collect::<Vec<_>>()
                .join("\n");
            let trimmed = joined.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        _ => {}
    }

    if let Some(s) = body
        .messages
        .as_ref()
        .and_then(|msgs| msgs.last())
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return Some(s.to_string());
    }

    if let Some(p) = body.prompt.as_deref().filter(|p| !p.is_empty()) {
        return Some(p.to_string());
    }

    fallback.map(str::to_string)
}

/// Text fragments of a single `input[]` element, in order.
fn input_item_texts(item: &Value) -> Vec<&str> {
    match item {
        Value::String(s) => vec![s.as_str()],
        Value::Object(obj) => match obj.get("content") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(parts)) => parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect(),
            // bare content block, e.g. { "type": "input_text", "text": "..." }
            _ => obj
                .get("text")
                .and_then(Value::as_str)
                .into_iter()
                .collect(),
        },
        _ => Vec::new(),
    }
}

/// Build the Chat Completions body for one model.
///
/// Messages are always a system + user pair: `instructions` (or the server
/// default) followed by the extracted user text. Caller `messages` are not
/// forwarded.
pub fn build_upstream_payload(
    body: &InboundRequest,
    user_text: &str,
    model: &str,
    defaults: PayloadDefaults<'_>,
) -> UpstreamPayload {
    let system = body
        .instructions
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(defaults.system_prompt);

    let tools = body
        .tools
        .as_deref()
        .map(|ts| normalize_tools(ts, ToolForm::Nested))
        .filter(|ts| !ts.is_empty());

    UpstreamPayload {
        model: model.to_string(),
        messages: vec![ChatMessage::system(system), ChatMessage::user(user_text)],
        tools,
        tool_choice: body.tool_choice.clone().filter(|v| !v.is_null()),
        temperature: body.temperature.unwrap_or(defaults.temperature),
        max_tokens: body
            .max_output_tokens
            .or(body.max_tokens)
            .unwrap_or(defaults.max_tokens),
    }
}

/// Wrap a plain answer in the Responses shape.
pub fn to_responses_format(model: &str, text: &str, usage: Option<&ChatUsage>) -> OutboundResponse {
    OutboundResponse {
        id: format!("resp_{}", uuid::Uuid::new_v4().simple()),
        object: "response".into(),
        created: unix_now(),
        model: model.to_string(),
        status: "completed".into(),
        output: vec![OutputItem::Message {
            id: format!("msg_{}", uuid::Uuid::new_v4().simple()),
            role: "assistant".into(),
            status: "completed".into(),
            content: vec![OutputContent::OutputText {
                text: text.to_string(),
                annotations: Vec::new(),
            }],
        }],
        output_text: Some(text.to_string()),
        usage: usage.map(map_usage),
    }
}

/// Translate a successful Chat Completions body into the Responses shape.
///
/// The body must carry a first choice with a message holding either text
/// content or tool calls. Null content next to tool calls becomes an empty
/// string; tool calls follow the message as `function_call` items.
pub fn chat_to_responses(model: &str, data: &Value) -> Result<OutboundResponse, AdapterError> {
    let parsed = serde_json::from_value::<ChatCompletionResponse>(data.clone()).map_err(|e| {
        AdapterError::Internal(format!("upstream reply is not a chat completion: {e}"))
    })?;

    let message = parsed
        .first_message()
        .ok_or_else(|| AdapterError::Internal("upstream reply has no choices".into()))?;

    let calls: Vec<_> = message
        .tool_calls
        .iter()
        .flatten()
        .filter(|c| !c.function.name.is_empty())
        .collect();
    if message.content.is_none() && calls.is_empty() {
        return Err(AdapterError::Internal(
            "upstream reply has neither content nor tool calls".into(),
        ));
    }

    let text = message.content.as_deref().unwrap_or_default();
    let mut out = to_responses_format(model, text, parsed.usage.as_ref());

    for call in calls {
        let call_id = call
            .id
            .clone()
            .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
        out.output.push(OutputItem::FunctionCall {
            id: format!("fc_{}", uuid::Uuid::new_v4().simple()),
            call_id,
            name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
            status: "completed".into(),
        });
    }

    Ok(out)
}

fn map_usage(u: &ChatUsage) -> ResponsesUsage {
    ResponsesUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
