use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::core::broker::BrokerError;
use crate::core::tools::ToolError;
use crate::core::voice_live::VoiceLiveError;

/// HTTP-facing error. Every variant renders as `{"detail": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),

    /// Error status and body relayed from an upstream Azure call
    #[error("{body}")]
    Upstream { status: StatusCode, body: String },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => *status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<BrokerError> for AppError {
    fn from(err: BrokerError) -> Self {
        match err {
            BrokerError::Upstream { status, body } => Self::Upstream { status, body },
            BrokerError::MalformedResponse(_) => {
                Self::Internal("Malformed session response from Azure".to_string())
            }
            BrokerError::Credential(e) => Self::ServiceUnavailable(e.to_string()),
            BrokerError::Transport(e) => Self::BadGateway(format!("Session request failed: {e}")),
        }
    }
}

impl From<ToolError> for AppError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => Self::NotFound(err.to_string()),
            ToolError::InvalidArguments(_) => Self::BadRequest(err.to_string()),
            ToolError::Execution(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<VoiceLiveError> for AppError {
    fn from(err: VoiceLiveError) -> Self {
        Self::BadGateway(err.to_string())
    }
}
