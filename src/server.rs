use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::adapter::Adapter;
use crate::error::AdapterError;
use crate::models::chat::UpstreamPayload;
use crate::models::inbound::InboundRequest;
use crate::models::responses::OutboundResponse;
use crate::util::cors_layer;

const ROUTES: &[&str] = &["/", "/status", "/v1/responses", "/v1/convert"];

/// Build the Axum router around a shared adapter.
pub fn build_router(adapter: Arc<Adapter>) -> Router {
    let config = adapter.config();
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes));

    Router::new()
        .route("/", get(status).post(responses))
        .route("/status", get(status))
        .route("/v1/responses", post(responses))
        .route("/v1/convert", post(convert))
        .layer(layers)
        .with_state(adapter)
}

/// Liveness plus the effective model setup.
async fn status(State(adapter): State<Arc<Adapter>>) -> impl IntoResponse {
    let config = adapter.config();
    Json(serde_json::json!({
        "name": "responses2chat",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "provider": config.provider,
        "default_model": config.default_model,
        "fallback_models": config.fallback_models,
        "credential_configured": config.api_key.is_some(),
        "routes": ROUTES,
    }))
}

/// Translate, forward with model fallback, and answer in the Responses shape.
async fn responses(
    State(adapter): State<Arc<Adapter>>,
    body: Result<Json<InboundRequest>, JsonRejection>,
) -> Result<Json<OutboundResponse>, AdapterError> {
    let Json(req) = body?;
    let out = adapter.respond(&req).await?;
    Ok(Json(out))
}

/// Show the upstream payload a request would produce, without sending it.
async fn convert(
    State(adapter): State<Arc<Adapter>>,
    body: Result<Json<InboundRequest>, JsonRejection>,
) -> Result<Json<UpstreamPayload>, AdapterError> {
    let Json(req) = body?;
    let prepared = adapter.prepare(&req)?;
    Ok(Json(prepared.payload))
}
