//! Voice Live route configuration
//!
//! # Endpoints
//!
//! - `GET /api/voicelive/ws` - WebSocket relay to Azure Voice Live
//! - `GET /api/voicelive/config` - Session settings for the frontend
//! - `GET /api/voicelive/voices?language=pt` - Available speech voices
//! - `POST /api/voicelive/synthesize` - Text-to-speech (MP3)
//!
//! # Relay protocol
//!
//! The browser sends JSON control events as text frames and PCM16 audio as
//! binary frames. Binary audio is wrapped into `input_audio_buffer.append`
//! events upstream. Audio deltas from upstream arrive back as binary frames,
//! each followed by the originating event with its audio fields emptied.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::voicelive;
use crate::state::AppState;
use std::sync::Arc;

pub fn create_voicelive_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/voicelive/ws", get(voicelive::voicelive_ws_handler))
        .route("/api/voicelive/config", get(voicelive::voicelive_config))
        .route("/api/voicelive/voices", get(voicelive::list_voices))
        .route("/api/voicelive/synthesize", post(voicelive::synthesize))
        .layer(TraceLayer::new_for_http())
}
