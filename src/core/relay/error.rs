use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::core::credentials::CredentialError;

/// Errors that end a relay session.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream WebSocket handshake failed
    #[error("Upstream connection failed: {0}")]
    UpstreamConnect(String),

    /// The upstream WebSocket handshake did not finish in time
    #[error("Upstream connection timed out after {0:?}")]
    UpstreamConnectTimeout(Duration),

    /// The configured upstream URL cannot be turned into a request
    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    /// No usable credential for the upstream
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Reading from or writing to the browser socket failed
    #[error("Downstream transport error: {0}")]
    Downstream(String),

    /// Reading from or writing to the upstream socket failed
    #[error("Upstream transport error: {0}")]
    Upstream(String),

    /// An outgoing event could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    pub fn downstream(error: impl fmt::Display) -> Self {
        Self::Downstream(error.to_string())
    }

    pub fn upstream(error: impl fmt::Display) -> Self {
        Self::Upstream(error.to_string())
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
