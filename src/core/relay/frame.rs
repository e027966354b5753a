//! Transport-neutral frames exchanged by the relay pumps.
//!
//! The downstream side speaks axum's WebSocket message type and the upstream
//! side speaks tungstenite's. Both are converted into [`RelayFrame`] at the
//! session boundary so the pumps can be driven by any `Stream`/`Sink` pair,
//! including in-memory channels in tests.

use axum::extract::ws;
use bytes::Bytes;
use tokio_tungstenite::tungstenite;

/// Maximum length in bytes of a WebSocket close reason (RFC 6455 §5.5).
pub const MAX_CLOSE_REASON_BYTES: usize = 123;

/// Policy violation close code, used when the relay is not configured.
pub const CLOSE_POLICY_VIOLATION: u16 = 1008;

/// Internal error close code, used for unexpected setup failures.
pub const CLOSE_INTERNAL_ERROR: u16 = 1011;

/// "Try again later" close code, used when the upstream service is unreachable.
pub const CLOSE_UPSTREAM_UNAVAILABLE: u16 = 1013;

/// Close code and reason carried by a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    pub code: u16,
    pub reason: String,
}

impl CloseReason {
    /// Build a close reason, truncating the text to the protocol limit.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        let mut reason = reason.into();
        truncate_reason(&mut reason);
        Self { code, reason }
    }
}

/// A single relayed WebSocket frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    /// UTF-8 text frame (JSON control events)
    Text(String),
    /// Binary frame (PCM16 audio)
    Binary(Bytes),
    /// Close frame, optionally with a code and reason
    Close(Option<CloseReason>),
}

impl RelayFrame {
    /// Convert a downstream (axum) message. Ping/pong frames yield `None`.
    pub fn from_downstream(message: ws::Message) -> Option<Self> {
        match message {
            ws::Message::Text(text) => Some(Self::Text(text.as_str().to_owned())),
            ws::Message::Binary(data) => Some(Self::Binary(data)),
            ws::Message::Close(frame) => Some(Self::Close(frame.map(|f| CloseReason {
                code: f.code,
                reason: f.reason.as_str().to_owned(),
            }))),
            ws::Message::Ping(_) | ws::Message::Pong(_) => None,
        }
    }

    /// Convert into a downstream (axum) message.
    pub fn into_downstream(self) -> ws::Message {
        match self {
            Self::Text(text) => ws::Message::Text(text.into()),
            Self::Binary(data) => ws::Message::Binary(data),
            Self::Close(reason) => ws::Message::Close(reason.map(|r| ws::CloseFrame {
                code: r.code,
                reason: r.reason.into(),
            })),
        }
    }

    /// Convert an upstream (tungstenite) message. Control frames yield `None`.
    pub fn from_upstream(message: tungstenite::Message) -> Option<Self> {
        match message {
            tungstenite::Message::Text(text) => Some(Self::Text(text.as_str().to_owned())),
            tungstenite::Message::Binary(data) => Some(Self::Binary(data)),
            tungstenite::Message::Close(frame) => Some(Self::Close(frame.map(|f| CloseReason {
                code: u16::from(f.code),
                reason: f.reason.as_str().to_owned(),
            }))),
            tungstenite::Message::Ping(_)
            | tungstenite::Message::Pong(_)
            | tungstenite::Message::Frame(_) => None,
        }
    }

    /// Convert into an upstream (tungstenite) message.
    pub fn into_upstream(self) -> tungstenite::Message {
        match self {
            Self::Text(text) => tungstenite::Message::Text(text.into()),
            Self::Binary(data) => tungstenite::Message::Binary(data),
            Self::Close(reason) => tungstenite::Message::Close(reason.map(|r| {
                tungstenite::protocol::CloseFrame {
                    code: r.code.into(),
                    reason: r.reason.into(),
                }
            })),
        }
    }
}

fn truncate_reason(reason: &mut String) {
    if reason.len() <= MAX_CLOSE_REASON_BYTES {
        return;
    }
    let mut end = MAX_CLOSE_REASON_BYTES;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    reason.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_reason_truncated_on_char_boundary() {
        let long = "é".repeat(100);
        let reason = CloseReason::new(CLOSE_INTERNAL_ERROR, long);
        assert!(reason.reason.len() <= MAX_CLOSE_REASON_BYTES);
        assert_eq!(reason.reason.len() % 2, 0);
    }

    #[test]
    fn test_short_close_reason_untouched() {
        let reason = CloseReason::new(CLOSE_POLICY_VIOLATION, "not configured");
        assert_eq!(reason.reason, "not configured");
        assert_eq!(reason.code, 1008);
    }

    #[test]
    fn test_downstream_ping_is_skipped() {
        let ping = ws::Message::Ping(Bytes::from_static(b"hi"));
        assert!(RelayFrame::from_downstream(ping).is_none());
    }

    #[test]
    fn test_downstream_conversion_preserves_payload() {
        let text = RelayFrame::from_downstream(ws::Message::Text("{\"a\":1}".into()));
        assert_eq!(text, Some(RelayFrame::Text("{\"a\":1}".to_string())));

        let audio = Bytes::from_static(&[1, 2, 3, 4]);
        let binary = RelayFrame::from_downstream(ws::Message::Binary(audio.clone()));
        assert_eq!(binary, Some(RelayFrame::Binary(audio)));
    }

    #[test]
    fn test_upstream_close_code_round_trips() {
        let frame = RelayFrame::Close(Some(CloseReason::new(CLOSE_UPSTREAM_UNAVAILABLE, "later")));
        let message = frame.clone().into_upstream();
        assert_eq!(RelayFrame::from_upstream(message), Some(frame));
    }

    #[test]
    fn test_upstream_pong_is_skipped() {
        let pong = tungstenite::Message::Pong(Bytes::new());
        assert!(RelayFrame::from_upstream(pong).is_none());
    }
}
