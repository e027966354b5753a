//! Relay session: one browser WebSocket bridged to one upstream WebSocket.
//!
//! The session opens the upstream connection, then runs two pumps inside a
//! single task:
//!
//! - **to upstream**: browser text is forwarded verbatim, browser binary audio
//!   is wrapped in an `input_audio_buffer.append` event.
//! - **to downstream**: upstream binary is forwarded verbatim, audio-delta
//!   events are split into a binary audio frame plus the stripped event, and
//!   everything else is forwarded as received.
//!
//! Whichever pump finishes first ends the session. The other pump is dropped
//! and both connections are closed before [`RelaySession::run`] returns.

use axum::extract::ws::WebSocket;
use futures::{Sink, SinkExt, Stream, StreamExt, future};
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tracing::{debug, error, info, warn};
use url::Url;

use super::events::{UpstreamText, audio_append_event, translate_upstream_text};
use super::frame::{
    CLOSE_INTERNAL_ERROR, CLOSE_UPSTREAM_UNAVAILABLE, CloseReason, RelayFrame,
};
use super::{RelayError, RelayResult};
use crate::core::credentials::AzureCredential;

/// Default upper bound for opening the upstream connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for closing each connection once the session is over.
pub const CLOSE_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Characters of text payload included in debug logs.
const LOG_PREVIEW_CHARS: usize = 200;

/// Where and how to open the upstream connection.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub url: Url,
    pub credential: AzureCredential,
    pub connect_timeout: Duration,
}

impl UpstreamTarget {
    pub fn new(url: Url, credential: AzureCredential) -> Self {
        Self {
            url,
            credential,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// Relay direction, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToUpstream,
    ToDownstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToUpstream => f.write_str("downstream->upstream"),
            Self::ToDownstream => f.write_str("upstream->downstream"),
        }
    }
}

/// Why a pump stopped without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEnd {
    DownstreamClosed,
    UpstreamClosed,
}

/// How a bridged session ended.
#[derive(Debug)]
pub struct SessionEnd {
    /// Direction whose pump finished first
    pub direction: Direction,
    /// Outcome of that pump
    pub outcome: RelayResult<PumpEnd>,
}

/// One browser connection and its upstream counterpart.
pub struct RelaySession {
    id: String,
    downstream: WebSocket,
    target: UpstreamTarget,
}

impl RelaySession {
    pub fn new(downstream: WebSocket, target: UpstreamTarget) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            downstream,
            target,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run the session to completion. Never returns an error: failures are
    /// logged and reported to the browser as a close frame.
    pub async fn run(self) {
        let Self {
            id,
            downstream,
            target,
        } = self;

        info!(session_id = %id, upstream = %redact_url(&target.url), "Opening upstream connection");

        let (downstream_tx, downstream_rx) = downstream.split();
        let mut downstream_tx = downstream_tx
            .sink_map_err(RelayError::downstream)
            .with(|frame: RelayFrame| future::ready(Ok::<_, RelayError>(frame.into_downstream())));
        let downstream_rx = downstream_rx.filter_map(|message| {
            future::ready(match message {
                Ok(message) => RelayFrame::from_downstream(message).map(Ok),
                Err(e) => Some(Err(RelayError::downstream(e))),
            })
        });

        let upstream = match connect_upstream(&target).await {
            Ok(upstream) => upstream,
            Err(e) => {
                error!(session_id = %id, error = %e, "Relay session setup failed");
                let reason = setup_close_reason(&e);
                close_sink(&mut downstream_tx, Some(reason), &id, "downstream").await;
                return;
            }
        };

        info!(session_id = %id, "Upstream connected, relaying");

        let (upstream_tx, upstream_rx) = upstream.split();
        let upstream_tx = upstream_tx
            .sink_map_err(RelayError::upstream)
            .with(|frame: RelayFrame| future::ready(Ok::<_, RelayError>(frame.into_upstream())));
        let upstream_rx = upstream_rx.filter_map(|message| {
            future::ready(match message {
                Ok(message) => RelayFrame::from_upstream(message).map(Ok),
                Err(e) => Some(Err(RelayError::upstream(e))),
            })
        });

        let end = bridge(&id, downstream_rx, downstream_tx, upstream_rx, upstream_tx).await;
        match &end.outcome {
            Ok(reason) => info!(
                session_id = %id,
                direction = %end.direction,
                reason = ?reason,
                "Relay session finished"
            ),
            Err(e) => warn!(
                session_id = %id,
                direction = %end.direction,
                error = %e,
                "Relay session ended by transport error"
            ),
        }
    }
}

/// Open the upstream WebSocket with the credential's auth header attached.
pub async fn connect_upstream(
    target: &UpstreamTarget,
) -> RelayResult<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
> {
    let mut request = target
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| RelayError::InvalidUpstreamUrl(e.to_string()))?;

    let (name, value) = target.credential.auth_header().await?;
    request.headers_mut().insert(name, value);

    let (stream, response) = timeout(
        target.connect_timeout,
        tokio_tungstenite::connect_async(request),
    )
    .await
    .map_err(|_| RelayError::UpstreamConnectTimeout(target.connect_timeout))?
    .map_err(|e| RelayError::UpstreamConnect(e.to_string()))?;

    debug!(status = %response.status(), "Upstream handshake completed");
    Ok(stream)
}

/// Pump frames in both directions until one side ends, then close both sinks.
///
/// Generic over the transport so it can be driven by in-memory channels.
pub async fn bridge<DR, DT, UR, UT>(
    session_id: &str,
    downstream_rx: DR,
    downstream_tx: DT,
    upstream_rx: UR,
    upstream_tx: UT,
) -> SessionEnd
where
    DR: Stream<Item = RelayResult<RelayFrame>>,
    DT: Sink<RelayFrame, Error = RelayError>,
    UR: Stream<Item = RelayResult<RelayFrame>>,
    UT: Sink<RelayFrame, Error = RelayError>,
{
    let mut downstream_rx = std::pin::pin!(downstream_rx);
    let mut downstream_tx = std::pin::pin!(downstream_tx);
    let mut upstream_rx = std::pin::pin!(upstream_rx);
    let mut upstream_tx = std::pin::pin!(upstream_tx);

    let end = tokio::select! {
        outcome = pump_to_upstream(session_id, &mut downstream_rx, &mut upstream_tx) => SessionEnd {
            direction: Direction::ToUpstream,
            outcome,
        },
        outcome = pump_to_downstream(session_id, &mut upstream_rx, &mut downstream_tx) => SessionEnd {
            direction: Direction::ToDownstream,
            outcome,
        },
    };

    close_sink(&mut upstream_tx, None, session_id, "upstream").await;
    close_sink(&mut downstream_tx, None, session_id, "downstream").await;

    end
}

/// Downstream → upstream: text verbatim, binary wrapped as an audio append.
pub async fn pump_to_upstream<S, K>(
    session_id: &str,
    downstream: &mut S,
    upstream: &mut K,
) -> RelayResult<PumpEnd>
where
    S: Stream<Item = RelayResult<RelayFrame>> + Unpin,
    K: Sink<RelayFrame, Error = RelayError> + Unpin,
{
    while let Some(frame) = downstream.next().await {
        match frame? {
            RelayFrame::Text(text) => {
                debug!(
                    session_id,
                    chars = text.len(),
                    preview = %preview(&text),
                    "Downstream -> upstream text"
                );
                upstream.send(RelayFrame::Text(text)).await?;
            }
            RelayFrame::Binary(audio) => {
                debug!(session_id, bytes = audio.len(), "Downstream -> upstream audio");
                let event = audio_append_event(&audio)?;
                upstream.send(RelayFrame::Text(event)).await?;
            }
            RelayFrame::Close(reason) => {
                info!(session_id, reason = ?reason, "Downstream closed");
                return Ok(PumpEnd::DownstreamClosed);
            }
        }
    }

    info!(session_id, "Downstream stream ended");
    Ok(PumpEnd::DownstreamClosed)
}

/// Upstream → downstream: binary verbatim, audio deltas split into binary
/// audio plus the stripped event, everything else verbatim.
pub async fn pump_to_downstream<S, K>(
    session_id: &str,
    upstream: &mut S,
    downstream: &mut K,
) -> RelayResult<PumpEnd>
where
    S: Stream<Item = RelayResult<RelayFrame>> + Unpin,
    K: Sink<RelayFrame, Error = RelayError> + Unpin,
{
    while let Some(frame) = upstream.next().await {
        match frame? {
            RelayFrame::Binary(audio) => {
                debug!(session_id, bytes = audio.len(), "Upstream -> downstream audio");
                downstream.send(RelayFrame::Binary(audio)).await?;
            }
            RelayFrame::Text(text) => {
                debug!(
                    session_id,
                    chars = text.len(),
                    preview = %preview(&text),
                    "Upstream -> downstream text"
                );
                match translate_upstream_text(text) {
                    UpstreamText::Passthrough(text) => {
                        downstream.send(RelayFrame::Text(text)).await?;
                    }
                    UpstreamText::AudioDelta { audio, event } => {
                        if let Some(audio) = audio {
                            debug!(session_id, bytes = audio.len(), "Extracted audio delta");
                            downstream.send(RelayFrame::Binary(audio)).await?;
                        }
                        downstream.send(RelayFrame::Text(event)).await?;
                    }
                    UpstreamText::Dropped { reason } => {
                        warn!(session_id, reason = %reason, "Dropping upstream message");
                    }
                }
            }
            RelayFrame::Close(reason) => {
                info!(session_id, reason = ?reason, "Upstream closed");
                return Ok(PumpEnd::UpstreamClosed);
            }
        }
    }

    info!(session_id, "Upstream stream ended");
    Ok(PumpEnd::UpstreamClosed)
}

/// Send an optional close frame, then close the sink, within the grace period.
async fn close_sink<K>(sink: &mut K, reason: Option<CloseReason>, session_id: &str, side: &str)
where
    K: Sink<RelayFrame, Error = RelayError> + Unpin,
{
    let result = timeout(CLOSE_GRACE_PERIOD, async {
        if let Some(reason) = reason {
            sink.send(RelayFrame::Close(Some(reason))).await?;
        }
        sink.close().await
    })
    .await;

    match result {
        Ok(Ok(())) => debug!(session_id, side, "Connection closed"),
        Ok(Err(e)) => debug!(session_id, side, error = %e, "Connection already closed"),
        Err(_) => warn!(session_id, side, "Timed out closing connection"),
    }
}

fn setup_close_reason(error: &RelayError) -> CloseReason {
    match error {
        RelayError::UpstreamConnect(_) | RelayError::UpstreamConnectTimeout(_) => {
            CloseReason::new(CLOSE_UPSTREAM_UNAVAILABLE, error.to_string())
        }
        _ => CloseReason::new(CLOSE_INTERNAL_ERROR, "Internal relay error"),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

/// Strip credentials and query parameters from a URL before logging it.
fn redact_url(url: &Url) -> String {
    format!(
        "{}://{}{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.path()
    )
}
