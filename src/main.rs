use std::sync::Arc;

use anyhow::Context;
use boilerplate_api::{
    handler,
    service::config::{ConfigService, ConfigServiceImpl},
    state::AppState,
    telemetry,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Variables already in the environment take precedence over `.env`.
    let dotenv = dotenvy::dotenv().ok();

    let config: Arc<dyn ConfigService> = Arc::new(ConfigServiceImpl::new());
    let cfg = config.values();
    telemetry::init(&cfg.app);
    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }
    info!(config = ?cfg, "configuration loaded");

    let bind_addr = cfg.app.bind_addr();
    let state = AppState::new(config.clone()).await?;
    let app = handler::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;
    info!(addr = %bind_addr, app = %cfg.app.name, env = %cfg.app.env, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
