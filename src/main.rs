use anyhow::Context;
use responses2chat::server::build_router;
use responses2chat::util::init_tracing;
use responses2chat::{Adapter, Config};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        provider = config.provider.as_str(),
        upstream = %config.upstream_url,
        default_model = %config.default_model,
        fallback_models = ?config.fallback_models,
        "configuration loaded"
    );
    if config.api_key.is_none() {
        tracing::warn!(
            "{} not set; requests will fail until it is provided",
            config.provider.api_key_var()
        );
    }

    let addr = config.bind_addr();
    let app = build_router(Arc::new(Adapter::from_config(config)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Responses2Chat listening on http://{}", addr);

    axum::serve(listener, app).await.context("serving axum app")?;
    Ok(())
}
