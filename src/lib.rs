#![forbid(unsafe_code)]
#![doc = r#"
Responses2Chat

Accept Responses-style (`input`/`tools`) or Chat-style (`messages`) requests, forward them as
Chat Completions calls to Groq or OpenAI, and answer in the Responses shape.

Crate highlights
- Library: pure translation in `conversion` (`normalize_tools`, `extract_user_text`,
  `build_upstream_payload`, `to_responses_format`).
- Model fallback: `upstream::complete_with_fallback` walks an ordered model list and only moves on
  when the upstream reports the model as decommissioned or missing.
- HTTP server (in `server`): `/`, `/status`, `/v1/responses` and `/v1/convert`.

Modules
- `models`: Inbound, tool, Chat and Responses data structures.
- `conversion`: Mapping logic between the shapes.
- `upstream`: Upstream seam, reqwest client and fallback loop.
- `adapter`: One request/response cycle built from the above.
- `config`: Immutable configuration loaded once from the environment.
- `error`: Error taxonomy and the JSON error envelope.
- `server`: Axum router/handlers.
- `util`: Shared helpers (tracing, HTTP client, CORS).
"#]

pub mod adapter;
pub mod config;
pub mod conversion;
pub mod error;
pub mod models;
pub mod server;
pub mod upstream;
pub mod util;

pub use crate::adapter::Adapter;
pub use crate::config::{Config, Provider};
pub use crate::conversion::{
    build_upstream_payload, extract_user_text, normalize_tools, to_responses_format,
};
pub use crate::error::AdapterError;

// Re-export model namespaces for convenience (downstream users can do `use responses2chat::chat`).
pub use crate::models::{chat, inbound, responses, tools};
