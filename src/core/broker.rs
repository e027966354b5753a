//! Ephemeral session broker for the Azure GPT Realtime (WebRTC) path.
//!
//! The browser never sees the long-lived Azure key. Instead it asks the
//! broker for a short-lived client secret bound to a new realtime session.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::core::credentials::{AzureCredential, CredentialError};

/// Default timeout for the session-creation request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of characters of an upstream error body kept in errors.
const MAX_ERROR_BODY_CHARS: usize = 2048;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Session request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Session request rejected with status {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Malformed session response from Azure: {0}")]
    MalformedResponse(String),
}

pub type BrokerResult<T> = Result<T, BrokerError>;

/// Credentials for one realtime session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionGrant {
    pub session_id: String,
    pub ephemeral_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    model: &'a str,
    voice: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: Option<String>,
    client_secret: Option<ClientSecret>,
}

#[derive(Deserialize)]
struct ClientSecret {
    value: Option<String>,
    expires_at: Option<i64>,
}

/// Client for the realtime session-creation endpoint.
#[derive(Debug, Clone)]
pub struct SessionBroker {
    client: reqwest::Client,
    session_url: String,
    credential: AzureCredential,
}

impl SessionBroker {
    pub fn new(
        session_url: impl Into<String>,
        credential: AzureCredential,
        request_timeout: Duration,
    ) -> BrokerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            session_url: session_url.into(),
            credential,
        })
    }

    pub fn session_url(&self) -> &str {
        &self.session_url
    }

    /// Create a realtime session and return its ephemeral client secret.
    pub async fn create_session(&self, deployment: &str, voice: &str) -> BrokerResult<SessionGrant> {
        let (header, value) = self.credential.auth_header().await?;

        info!(deployment, voice, "Creating realtime session");

        let response = self
            .client
            .post(&self.session_url)
            .header(header, value)
            .json(&SessionRequest {
                model: deployment,
                voice,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Realtime session request rejected");
            return Err(BrokerError::Upstream {
                status,
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.bytes().await?;
        let parsed: SessionResponse = serde_json::from_slice(&body)
            .map_err(|e| BrokerError::MalformedResponse(e.to_string()))?;

        let secret = parsed.client_secret;
        let expires_at = secret.as_ref().and_then(|s| s.expires_at);
        let ephemeral_key = secret
            .and_then(|s| s.value)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| BrokerError::MalformedResponse("missing client_secret.value".into()))?;
        let session_id = parsed
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BrokerError::MalformedResponse("missing id".into()))?;

        debug!(session_id = %session_id, "Realtime session created");

        Ok(SessionGrant {
            session_id,
            ephemeral_key,
            expires_at,
        })
    }
}
