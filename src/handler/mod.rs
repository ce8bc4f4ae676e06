use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{openapi::ApiDoc, state::AppState};

pub mod auth;
pub mod health;

pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::routes(state.config_handle()))
        .merge(health::ready_routes(state.clone()))
        .merge(auth::routes(state.clone()));

    if !state.config().values().app.is_production() {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    app.layer(TraceLayer::new_for_http())
}
