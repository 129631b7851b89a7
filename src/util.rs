use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Load `.env` (searched from the working directory upwards) and install
/// the fmt subscriber filtered by `RUST_LOG`.
///
/// Variables already present in the process environment win over the file.
pub fn init_tracing() {
    let env_file = dotenvy::dotenv().ok();

    // RUST_LOG may itself come from the env file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    let _ = fmt().with_env_filter(filter).try_init();

    match env_file {
        Some(path) => tracing::info!(path = %path.display(), "environment file loaded"),
        None => tracing::debug!("no .env file found, using process environment"),
    }
}

/// Build the upstream HTTP client from configuration.
///
/// - `no_proxy` disables every proxy, including HTTP(S)_PROXY from the environment
/// - `proxy_url` routes all schemes through one proxy
/// - `http_timeout` sets an overall request timeout; none by default
pub fn build_http_client(config: &Config) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.http_timeout {
        builder = builder.timeout(timeout);
    }

    if config.no_proxy {
        builder = builder.no_proxy();
    } else if let Some(url) = config.proxy_url.as_deref() {
        match reqwest::Proxy::all(url) {
            Ok(p) => builder = builder.proxy(p),
            Err(e) => tracing::warn!(error = %e, "ignoring invalid PROXY_URL"),
        }
    }

    builder = builder.user_agent(format!("responses2chat/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default HTTP client");
        reqwest::Client::new()
    })
}

/// Build a JSON error envelope `{ "error": { "message", "details"? } }`.
pub fn error_response(status: StatusCode, msg: &str, details: Option<serde_json::Value>) -> Response {
    let mut error = serde_json::json!({ "message": msg });
    if let Some(d) = details {
        error["details"] = d;
    }
    (status, axum::Json(serde_json::json!({ "error": error }))).into_response()
}

/// Build a CORS layer from the configured origin list.
///
/// An empty list allows any origin. Methods and headers are always permissive.
pub fn cors_layer(config: &Config) -> tower_http::cors::CorsLayer {
    use tower_http::cors::{AllowOrigin, Any, CorsLayer};

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let origins: Vec<http::HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| http::HeaderValue::from_str(o).ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
