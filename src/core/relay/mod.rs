//! WebSocket relay between browser clients and the Azure realtime endpoint.

pub mod error;
pub mod events;
pub mod frame;
pub mod session;

pub use error::{RelayError, RelayResult};
pub use events::{EventKind, UpstreamText, audio_append_event, translate_upstream_text};
pub use frame::{
    CLOSE_INTERNAL_ERROR, CLOSE_POLICY_VIOLATION, CLOSE_UPSTREAM_UNAVAILABLE, CloseReason,
    RelayFrame,
};
pub use session::{
    CLOSE_GRACE_PERIOD, DEFAULT_CONNECT_TIMEOUT, Direction, PumpEnd, RelaySession, SessionEnd,
    UpstreamTarget, bridge, connect_upstream,
};
