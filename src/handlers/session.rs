use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionRequest {
    /// Azure OpenAI deployment name
    pub deployment: Option<String>,
    /// Voice to request in the session
    pub voice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub ephemeral_key: String,
    /// Regional WebRTC entry point
    pub webrtc_url: Option<String>,
    pub deployment: String,
    pub voice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Issue an ephemeral key for a browser WebRTC session.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SessionRequest>,
) -> AppResult<Json<SessionResponse>> {
    let broker = state
        .broker
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("GPT Realtime API not configured".into()))?;

    let deployment = request
        .deployment
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| state.config.realtime_deployment.clone());
    let voice = request
        .voice
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| state.config.realtime_voice.clone());

    let grant = broker.create_session(&deployment, &voice).await?;
    info!(session_id = %grant.session_id, deployment = %deployment, "Issued realtime session");

    Ok(Json(SessionResponse {
        session_id: grant.session_id,
        ephemeral_key: grant.ephemeral_key,
        webrtc_url: state.config.webrtc_url.clone(),
        deployment,
        voice,
        expires_at: grant.expires_at,
    }))
}
