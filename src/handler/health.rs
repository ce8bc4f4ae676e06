use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{service::config::ConfigService, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct Health {
    pub status: &'static str,
    pub app: String,
    pub env: String,
}

#[derive(Serialize, ToSchema)]
pub struct Readiness {
    pub database: bool,
    pub cache: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service health", body = Health)
    ),
    tag = "health"
)]
pub async fn health(State(config): State<Arc<dyn ConfigService>>) -> Json<Health> {
    let app = &config.values().app;
    Json(Health {
        status: "ok",
        app: app.name.clone(),
        env: app.env.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/ready",
    responses(
        (status = 200, description = "Database and cache reachable", body = Readiness),
        (status = 503, description = "A dependency is unreachable", body = Readiness)
    ),
    tag = "health"
)]
pub async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Readiness>) {
    let database = state.db().conn().ping().await.is_ok();
    let cache = state.cache().ping().await.is_ok();
    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(Readiness { database, cache }))
}

pub fn routes(config: Arc<dyn ConfigService>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .with_state(config)
}

pub fn ready_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/ready", get(ready))
        .with_state(state)
}
