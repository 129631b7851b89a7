#![allow(dead_code)]

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use http::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Stand-in for a Chat Completions provider.
///
/// Answers per requested model; models without a scripted answer get the
/// default reply. Every request body and its Authorization header are recorded.
#[derive(Clone)]
pub struct UpstreamStub {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
pub struct StubReply {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct StubState {
    per_model: HashMap<String, StubReply>,
    default_reply: StubReply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub const CHAT_PATH: &str = "/openai/v1/chat/completions";

impl UpstreamStub {
    pub async fn start(per_model: HashMap<String, StubReply>, default_reply: StubReply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(StubState {
            per_model,
            default_reply,
            requests: requests.clone(),
        });

        let router = Router::new()
            .route(CHAT_PATH, post(chat_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub upstream local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, router.into_make_service());
        tokio::spawn(async move {
            tokio::select! {
                res = server => {
                    if let Err(err) = res {
                        eprintln!("Stub upstream server error: {err:?}");
                    }
                }
                _ = rx => {}
            }
        });

        UpstreamStub {
            base_url: format!("http://{}", addr),
            requests,
            shutdown: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Stub that answers every model with the same successful text.
    pub async fn answering(text: &str) -> Self {
        Self::start(HashMap::new(), ok_reply(text)).await
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_PATH)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock stub requests").clone()
    }

    pub fn requested_models(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.body.get("model").and_then(|m| m.as_str()).map(String::from))
            .collect()
    }
}

impl Drop for UpstreamStub {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.shutdown.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }
}

async fn chat_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let model = body
        .get("model")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string();
    let authorization = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    if let Ok(mut guard) = state.requests.lock() {
        guard.push(RecordedRequest {
            authorization,
            body: body.clone(),
        });
    }

    let reply = state
        .per_model
        .get(&model)
        .unwrap_or(&state.default_reply)
        .clone();
    (reply.status, Json(reply.body))
}

pub fn ok_reply(text: &str) -> StubReply {
    StubReply {
        status: StatusCode::OK,
        body: serde_json::json!({
            "id": "chatcmpl-stub",
            "object": "chat.completion",
            "created": 1_700_000_000u64,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        }),
    }
}

pub fn decommissioned_reply(model: &str) -> StubReply {
    StubReply {
        status: StatusCode::BAD_REQUEST,
        body: serde_json::json!({
            "error": {
                "message": format!("The model `{model}` has been decommissioned and is no longer supported."),
                "type": "invalid_request_error",
                "code": "model_decommissioned"
            }
        }),
    }
}

pub fn unauthorized_reply() -> StubReply {
    StubReply {
        status: StatusCode::UNAUTHORIZED,
        body: serde_json::json!({
            "error": {
                "message": "Invalid API Key",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        }),
    }
}
