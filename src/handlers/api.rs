use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Script that exposes runtime settings to the bundled frontend.
pub async fn runtime_config(State(state): State<Arc<AppState>>) -> Response {
    let script = runtime_config_script(&state.config.backend_base_url);
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        script,
    )
        .into_response()
}

pub fn runtime_config_script(backend_base_url: &str) -> String {
    let payload = json!({ "backendBaseUrl": backend_base_url });
    format!("window.__APP_CONFIG__ = Object.freeze({payload});")
}

/// Acknowledges the frontend framework's load notification.
pub async fn spark_loaded() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
