//! Control event translation between the browser and the upstream protocol.
//!
//! The upstream realtime protocol only ingests audio as base64 chunks wrapped
//! in an `input_audio_buffer.append` event, and it emits audio the same way in
//! `*.audio.delta` events. The browser exchanges raw PCM16 binary frames. This
//! module converts between the two shapes.

use base64::prelude::*;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

/// Event type used to append audio to the upstream input buffer.
pub const INPUT_AUDIO_APPEND: &str = "input_audio_buffer.append";

/// Legacy audio delta event name.
pub const RESPONSE_AUDIO_DELTA: &str = "response.audio.delta";

/// Current audio delta event name.
pub const RESPONSE_OUTPUT_AUDIO_DELTA: &str = "response.output_audio.delta";

#[derive(Serialize)]
struct AudioAppendEvent<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    audio: String,
}

/// Wrap raw PCM audio into an `input_audio_buffer.append` event.
pub fn audio_append_event(audio: &[u8]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&AudioAppendEvent {
        event_type: INPUT_AUDIO_APPEND,
        audio: BASE64_STANDARD.encode(audio),
    })
}

/// Handling rule selected by an upstream event's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Carries base64 audio in `delta` or `audio`
    AudioDelta,
    /// Forwarded untouched
    Passthrough,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            RESPONSE_AUDIO_DELTA | RESPONSE_OUTPUT_AUDIO_DELTA => Self::AudioDelta,
            _ => Self::Passthrough,
        }
    }
}

/// Result of translating one upstream text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamText {
    /// Forward the original text unchanged
    Passthrough(String),
    /// Send `audio` as a binary frame (if any), then `event` as text
    AudioDelta { audio: Option<Bytes>, event: String },
    /// Drop the message entirely
    Dropped { reason: String },
}

/// Translate a text message received from upstream.
///
/// Unparseable JSON, non-object JSON and events of any type other than the two
/// audio-delta names are passed through verbatim.
pub fn translate_upstream_text(text: String) -> UpstreamText {
    let mut event = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(event)) => event,
        _ => return UpstreamText::Passthrough(text),
    };

    let kind = event
        .get("type")
        .and_then(Value::as_str)
        .map_or(EventKind::Passthrough, EventKind::from_type);

    match kind {
        EventKind::Passthrough => UpstreamText::Passthrough(text),
        EventKind::AudioDelta => match extract_audio(&event) {
            Ok(audio) => {
                strip_audio(&mut event);
                match serde_json::to_string(&Value::Object(event)) {
                    Ok(event) => UpstreamText::AudioDelta { audio, event },
                    Err(e) => UpstreamText::Dropped {
                        reason: format!("failed to re-serialize audio delta: {e}"),
                    },
                }
            }
            Err(e) => UpstreamText::Dropped {
                reason: format!("invalid base64 audio: {e}"),
            },
        },
    }
}

/// Pull base64 audio from `delta`, falling back to `audio` when `delta` is
/// missing or empty.
fn extract_audio(event: &Map<String, Value>) -> Result<Option<Bytes>, base64::DecodeError> {
    let encoded = ["delta", "audio"]
        .iter()
        .filter_map(|field| event.get(*field).and_then(Value::as_str))
        .find(|value| !value.is_empty());

    encoded
        .map(|value| BASE64_STANDARD.decode(value).map(Bytes::from))
        .transpose()
}

fn strip_audio(event: &mut Map<String, Value>) {
    event.insert("delta".to_string(), Value::String(String::new()));
    event.insert("audio".to_string(), Value::String(String::new()));
}
