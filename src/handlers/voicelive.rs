//! Voice Live endpoints: relay WebSocket, frontend config, voices and TTS.

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::relay::{
    CLOSE_INTERNAL_ERROR, CLOSE_POLICY_VIOLATION, CloseReason, RelaySession,
};
use crate::core::voice_live::SynthesisOptions;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Maximum WebSocket frame size (10 MiB)
pub const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MiB)
pub const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Relay path as seen by the frontend, relative to its API base URL.
pub const RELAY_PATH: &str = "/voicelive/ws";

const NOT_CONFIGURED: &str = "Voice Live API not configured";

#[derive(Debug, Serialize)]
pub struct VoiceLiveConfigResponse {
    pub endpoint: &'static str,
    pub model: String,
    pub voice: String,
    pub language: String,
    pub temperature: f32,
    pub rate: String,
}

/// Settings the frontend uses to configure its Voice Live session.
pub async fn voicelive_config(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<VoiceLiveConfigResponse>> {
    if !state.config.voice_live_available() {
        return Err(AppError::ServiceUnavailable(NOT_CONFIGURED.into()));
    }
    let config = &state.config;
    Ok(Json(VoiceLiveConfigResponse {
        endpoint: RELAY_PATH,
        model: config.voice_live_model.clone(),
        voice: config.voice_live_voice.clone(),
        language: config.voice_live_language.clone(),
        temperature: config.voice_live_temperature,
        rate: config.voice_live_rate.clone(),
    }))
}

/// WebSocket relay to the Azure Voice Live endpoint.
///
/// The upgrade is always accepted. When Voice Live is not configured the
/// socket is closed immediately with 1008.
pub async fn voicelive_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("Voice Live WebSocket upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_voicelive_socket(socket, state))
}

async fn handle_voicelive_socket(mut socket: WebSocket, state: Arc<AppState>) {
    match state.voice_live_target() {
        Ok(Some(target)) => {
            let session = RelaySession::new(socket, target);
            info!(session_id = %session.id(), "Voice Live relay session started");
            session.run().await;
        }
        Ok(None) => {
            warn!("Rejecting Voice Live connection: not configured");
            close_with(&mut socket, CloseReason::new(CLOSE_POLICY_VIOLATION, NOT_CONFIGURED)).await;
        }
        Err(e) => {
            error!(error = %e, "Invalid Voice Live upstream configuration");
            close_with(
                &mut socket,
                CloseReason::new(CLOSE_INTERNAL_ERROR, "Internal relay error"),
            )
            .await;
        }
    }
}

async fn close_with(socket: &mut WebSocket, reason: CloseReason) {
    let frame = CloseFrame {
        code: reason.code,
        reason: reason.reason.into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        warn!(error = %e, "Failed to send close frame");
    }
}

#[derive(Debug, Deserialize)]
pub struct VoicesQuery {
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<Value>,
}

/// List speech voices, optionally filtered by locale prefix.
///
/// Upstream failures are logged and yield an empty list.
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VoicesQuery>,
) -> AppResult<Json<VoicesResponse>> {
    let client = state
        .voice_live
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable(NOT_CONFIGURED.into()))?;

    let voices = match client.list_voices(query.language.as_deref()).await {
        Ok(voices) => voices,
        Err(e) => {
            warn!(error = %e, "Failed to fetch Voice Live voices");
            Vec::new()
        }
    };

    Ok(Json(VoicesResponse { voices }))
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    pub voice: Option<String>,
    pub use_ssml: Option<bool>,
    pub rate: Option<String>,
    pub pitch: Option<String>,
    pub language: Option<String>,
}

impl SynthesizeRequest {
    fn options(&self, default_language: &str) -> SynthesisOptions {
        let defaults = SynthesisOptions::default();
        SynthesisOptions {
            voice: self.voice.clone().filter(|v| !v.is_empty()),
            use_ssml: self.use_ssml.unwrap_or(defaults.use_ssml),
            rate: self.rate.clone().unwrap_or(defaults.rate),
            pitch: self.pitch.clone().unwrap_or(defaults.pitch),
            language: self
                .language
                .clone()
                .unwrap_or_else(|| default_language.to_string()),
        }
    }
}

/// Synthesize speech and return MP3 audio.
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SynthesizeRequest>,
) -> AppResult<Response> {
    let client = state
        .voice_live
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable(NOT_CONFIGURED.into()))?;

    if request.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text must not be empty".into()));
    }

    let options = request.options(&state.config.voice_live_language);
    let audio = client.synthesize(&request.text, &options).await?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_request_defaults() {
        let request: SynthesizeRequest = serde_json::from_str(r#"{"text": "olá"}"#).unwrap();
        let options = request.options("pt-PT");
        assert!(options.use_ssml);
        assert_eq!(options.rate, "medium");
        assert_eq!(options.pitch, "medium");
        assert_eq!(options.language, "pt-PT");
        assert!(options.voice.is_none());
    }

    #[test]
    fn test_synthesize_request_overrides() {
        let request: SynthesizeRequest = serde_json::from_str(
            r#"{"text": "hi", "voice": "en-US-AvaNeural", "use_ssml": false, "rate": "fast", "language": "en-US"}"#,
        )
        .unwrap();
        let options = request.options("pt-PT");
        assert!(!options.use_ssml);
        assert_eq!(options.voice.as_deref(), Some("en-US-AvaNeural"));
        assert_eq!(options.rate, "fast");
        assert_eq!(options.language, "en-US");
    }
}
