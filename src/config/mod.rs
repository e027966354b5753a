//! Configuration module for the realtime relay server
//!
//! Configuration comes from `.env` files, environment variables and an optional
//! YAML file. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Applying YAML overrides on top of the environment
//! - `validation`: Configuration validation logic
//! - `utils`: Value cleaning and parsing helpers
//!
//! # Example
//! ```rust,no_run
//! use realtime_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::credentials::{AzureCredential, CredentialResult};

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use utils::clean_value;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REALTIME_DEPLOYMENT: &str = "gpt-realtime";
pub const DEFAULT_REALTIME_VOICE: &str = "alloy";
pub const DEFAULT_VOICE_LIVE_MODEL: &str = "gpt-4o";
pub const DEFAULT_VOICE_LIVE_VOICE: &str = "en-US-Ava:DragonHDLatestNeural";
pub const DEFAULT_VOICE_LIVE_LANGUAGE: &str = "pt-PT";
pub const DEFAULT_VOICE_LIVE_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_VOICE_LIVE_RATE: &str = "1.0";
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_SESSION_REQUEST_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8080/api";

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Which Azure realtime backend the frontend should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// GPT Realtime over WebRTC with a brokered ephemeral key
    #[default]
    Realtime,
    /// Voice Live over the server-side WebSocket relay
    VoiceLive,
}

impl ApiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::VoiceLive => "voicelive",
        }
    }
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realtime" => Ok(Self::Realtime),
            "voicelive" => Ok(Self::VoiceLive),
            _ => Err("Mode must be 'realtime' or 'voicelive'".to_string()),
        }
    }
}

/// Server configuration
///
/// Contains everything needed to run the relay:
/// - Server settings (host, port, TLS, initial API mode)
/// - GPT Realtime session broker settings
/// - Voice Live relay and speech settings
/// - Frontend hosting settings
/// - Security settings (CORS)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    /// Mode selected at startup; switchable at runtime
    pub api_mode: ApiMode,

    // GPT Realtime settings
    /// Azure endpoint that mints ephemeral realtime sessions
    pub realtime_session_url: Option<String>,
    /// Regional WebRTC entry point handed to the browser
    pub webrtc_url: Option<String>,
    pub realtime_deployment: String,
    pub realtime_voice: String,
    pub realtime_api_key: Option<String>,
    pub session_request_timeout_seconds: u64,

    /// Pre-issued Entra ID token used when no API key is configured
    pub azure_bearer_token: Option<String>,

    // Voice Live settings
    /// Upstream WebSocket endpoint, including its `api-version` query
    pub voice_live_endpoint: Option<String>,
    pub voice_live_api_key: Option<String>,
    pub voice_live_model: String,
    pub voice_live_voice: String,
    pub voice_live_language: String,
    pub voice_live_temperature: f32,
    /// Speaking rate handed to the frontend verbatim, e.g. `"1.0"`
    pub voice_live_rate: String,
    /// Azure Speech REST endpoint used for synthesis and voice listing
    pub voice_live_speech_endpoint: Option<String>,
    pub upstream_connect_timeout_seconds: u64,

    // Frontend
    pub frontend_dist_dir: Option<PathBuf>,
    pub backend_base_url: String,

    // Security settings
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (same-origin only)
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: None,
            api_mode: ApiMode::default(),
            realtime_session_url: None,
            webrtc_url: None,
            realtime_deployment: DEFAULT_REALTIME_DEPLOYMENT.to_string(),
            realtime_voice: DEFAULT_REALTIME_VOICE.to_string(),
            realtime_api_key: None,
            session_request_timeout_seconds: DEFAULT_SESSION_REQUEST_TIMEOUT_SECONDS,
            azure_bearer_token: None,
            voice_live_endpoint: None,
            voice_live_api_key: None,
            voice_live_model: DEFAULT_VOICE_LIVE_MODEL.to_string(),
            voice_live_voice: DEFAULT_VOICE_LIVE_VOICE.to_string(),
            voice_live_language: DEFAULT_VOICE_LIVE_LANGUAGE.to_string(),
            voice_live_temperature: DEFAULT_VOICE_LIVE_TEMPERATURE,
            voice_live_rate: DEFAULT_VOICE_LIVE_RATE.to_string(),
            voice_live_speech_endpoint: None,
            upstream_connect_timeout_seconds: DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS,
            frontend_dist_dir: None,
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            cors_allowed_origins: None,
        }
    }
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.realtime_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.voice_live_api_key {
            key.zeroize();
        }
        if let Some(ref mut token) = self.azure_bearer_token {
            token.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if the YAML file cannot be read or is malformed, an
    /// environment variable has an invalid format, or validation fails.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is loaded in main.rs, so the environment already reflects it here.
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;

        validation::validate(&config)?;

        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Credential for the GPT Realtime session broker.
    pub fn realtime_credential(&self) -> CredentialResult<AzureCredential> {
        AzureCredential::resolve(
            self.realtime_api_key.as_deref(),
            self.azure_bearer_token.as_deref(),
        )
    }

    /// Credential for the Voice Live relay.
    pub fn voice_live_credential(&self) -> CredentialResult<AzureCredential> {
        AzureCredential::resolve(
            self.voice_live_api_key.as_deref(),
            self.azure_bearer_token.as_deref(),
        )
    }

    /// GPT Realtime is usable when a session URL and a credential exist.
    pub fn realtime_available(&self) -> bool {
        self.realtime_session_url.is_some() && self.realtime_credential().is_ok()
    }

    /// Voice Live is usable when an endpoint and a credential exist.
    pub fn voice_live_available(&self) -> bool {
        self.voice_live_endpoint.is_some() && self.voice_live_credential().is_ok()
    }

    /// Default voice for the given mode.
    pub fn default_voice(&self, mode: ApiMode) -> &str {
        match mode {
            ApiMode::Realtime => &self.realtime_voice,
            ApiMode::VoiceLive => &self.voice_live_voice,
        }
    }

    pub fn upstream_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_connect_timeout_seconds)
    }

    pub fn session_request_timeout(&self) -> Duration {
        Duration::from_secs(self.session_request_timeout_seconds)
    }
}
