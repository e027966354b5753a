use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, mode, session, tools};
use crate::state::AppState;
use std::sync::Arc;

/// Create the JSON API router (`/api/*`, `/healthz`, `/runtime-config.js`)
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(api::health_check))
        .route("/runtime-config.js", get(api::runtime_config))
        .route("/api/mode", get(mode::get_mode).post(mode::set_mode))
        .route("/api/session", post(session::create_session))
        .route("/api/tools", get(tools::list_tools))
        .route("/api/function-call", post(tools::function_call))
        .layer(TraceLayer::new_for_http())
}
