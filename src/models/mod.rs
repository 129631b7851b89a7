//! Data models for both sides of the bridge.
//!
//! - `inbound`: the loosely typed request accepted from Responses-style or Chat-style clients.
//! - `tools`: the two function tool declaration shapes and the conversion between them.
//! - `chat`: the Chat Completions payload sent upstream and the reply read back.
//! - `responses`: the Responses-shaped record returned to callers.
//!
//! Mapping between them lives in `crate::conversion`.

pub mod chat;
pub mod inbound;
pub mod responses;
pub mod tools;

pub use chat::{ChatCompletionResponse, ChatMessage, ChatUsage, Role, UpstreamPayload};
pub use inbound::InboundRequest;
pub use responses::{OutboundResponse, OutputContent, OutputItem, ResponsesUsage};
pub use tools::{FunctionSpec, ToolDeclaration, ToolForm};
