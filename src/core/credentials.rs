//! Upstream credentials for Azure realtime services.
//!
//! Azure accepts either a static resource key in the `api-key` header or an
//! Entra ID bearer token in the `Authorization` header. How bearer tokens are
//! minted is left to the [`TokenProvider`] implementation.

use async_trait::async_trait;
use http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use zeroize::Zeroizing;

/// Header carrying a static Azure resource key.
pub const API_KEY_HEADER: &str = "api-key";

/// Errors produced while building upstream auth headers.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Neither an API key nor a bearer token is configured
    #[error("No Azure credential configured")]
    NotConfigured,

    /// The credential contains characters not allowed in a header value
    #[error("Credential is not a valid header value")]
    InvalidHeader,

    /// The token provider could not supply a token
    #[error("Bearer token unavailable: {0}")]
    TokenUnavailable(String),
}

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Source of short-lived bearer tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> CredentialResult<String>;
}

/// Token provider that always returns a pre-issued token.
pub struct StaticTokenProvider {
    token: Zeroizing<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> CredentialResult<String> {
        if self.token.is_empty() {
            return Err(CredentialError::TokenUnavailable(
                "configured token is empty".to_string(),
            ));
        }
        Ok(self.token.to_string())
    }
}

/// Credential used to authenticate against an Azure endpoint.
#[derive(Clone)]
pub enum AzureCredential {
    /// Static resource key sent as `api-key`
    ApiKey(Arc<Zeroizing<String>>),
    /// Bearer token fetched on every request
    Bearer(Arc<dyn TokenProvider>),
}

impl AzureCredential {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(Arc::new(Zeroizing::new(key.into())))
    }

    pub fn bearer(provider: Arc<dyn TokenProvider>) -> Self {
        Self::Bearer(provider)
    }

    /// Pick a credential: the static key wins, then the bearer token.
    pub fn resolve(api_key: Option<&str>, bearer_token: Option<&str>) -> CredentialResult<Self> {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            return Ok(Self::api_key(key));
        }
        if let Some(token) = bearer_token.filter(|t| !t.is_empty()) {
            return Ok(Self::bearer(Arc::new(StaticTokenProvider::new(token))));
        }
        Err(CredentialError::NotConfigured)
    }

    /// Build the auth header for one request or connection attempt.
    pub async fn auth_header(&self) -> CredentialResult<(HeaderName, HeaderValue)> {
        match self {
            Self::ApiKey(key) => {
                let mut value =
                    HeaderValue::from_str(key).map_err(|_| CredentialError::InvalidHeader)?;
                value.set_sensitive(true);
                Ok((HeaderName::from_static(API_KEY_HEADER), value))
            }
            Self::Bearer(provider) => {
                let token = Zeroizing::new(provider.token().await?);
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|_| CredentialError::InvalidHeader)?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }
        }
    }
}

impl fmt::Debug for AzureCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("AzureCredential::ApiKey(<redacted>)"),
            Self::Bearer(_) => f.write_str("AzureCredential::Bearer(<provider>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_api_key_header() {
        let credential = AzureCredential::api_key("secret-key");
        let (name, value) = credential.auth_header().await.unwrap();
        assert_eq!(name.as_str(), "api-key");
        assert_eq!(value, "secret-key");
        assert!(value.is_sensitive());
    }

    #[tokio::test]
    async fn test_bearer_header() {
        let credential = AzureCredential::bearer(Arc::new(StaticTokenProvider::new("tok")));
        let (name, value) = credential.auth_header().await.unwrap();
        assert_eq!(name, AUTHORIZATION);
        assert_eq!(value, "Bearer tok");
    }

    #[test]
    fn test_resolve_prefers_api_key() {
        let credential = AzureCredential::resolve(Some("key"), Some("token")).unwrap();
        assert!(matches!(credential, AzureCredential::ApiKey(_)));
    }

    #[test]
    fn test_resolve_falls_back_to_bearer() {
        let credential = AzureCredential::resolve(Some(""), Some("token")).unwrap();
        assert!(matches!(credential, AzureCredential::Bearer(_)));
    }

    #[test]
    fn test_resolve_without_credentials() {
        assert!(matches!(
            AzureCredential::resolve(None, None),
            Err(CredentialError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_invalid_header_value() {
        let credential = AzureCredential::api_key("bad\nkey");
        assert!(matches!(
            credential.auth_header().await,
            Err(CredentialError::InvalidHeader)
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let credential = AzureCredential::api_key("super-secret");
        assert!(!format!("{credential:?}").contains("super-secret"));
    }
}
