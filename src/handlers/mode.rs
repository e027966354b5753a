use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ApiMode;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub mode: ApiMode,
    pub realtime_available: bool,
    pub voicelive_available: bool,
    /// Default voice of the active mode
    pub voice: String,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: String,
}

fn mode_response(state: &AppState) -> ModeResponse {
    let mode = state.api_mode();
    ModeResponse {
        mode,
        realtime_available: state.config.realtime_available(),
        voicelive_available: state.config.voice_live_available(),
        voice: state.config.default_voice(mode).to_string(),
    }
}

pub async fn get_mode(State(state): State<Arc<AppState>>) -> Json<ModeResponse> {
    Json(mode_response(&state))
}

/// Switch between GPT Realtime and Voice Live.
pub async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModeRequest>,
) -> AppResult<Json<ModeResponse>> {
    let mode = request
        .mode
        .parse::<ApiMode>()
        .map_err(AppError::BadRequest)?;
    state.set_api_mode(mode).map_err(AppError::BadRequest)?;
    Ok(Json(mode_response(&state)))
}
