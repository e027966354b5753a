use std::path::PathBuf;

use super::utils::{env_parse, env_var, env_var_or, parse_bool};
use super::validation;
use super::{
    ApiMode, DEFAULT_BACKEND_BASE_URL, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REALTIME_DEPLOYMENT,
    DEFAULT_REALTIME_VOICE, DEFAULT_SESSION_REQUEST_TIMEOUT_SECONDS,
    DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS, DEFAULT_VOICE_LIVE_LANGUAGE,
    DEFAULT_VOICE_LIVE_MODEL, DEFAULT_VOICE_LIVE_RATE, DEFAULT_VOICE_LIVE_TEMPERATURE,
    DEFAULT_VOICE_LIVE_VOICE, ServerConfig, TlsConfig,
};

impl ServerConfig {
    /// Load configuration from environment variables only
    ///
    /// Missing variables fall back to defaults. Values are trimmed and
    /// stripped of surrounding quotes before parsing.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or the resulting
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_env_config()?;
        validation::validate(&config)?;
        Ok(config)
    }
}

/// Build a configuration from the environment without validating it.
pub(crate) fn load_env_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let tls = load_tls_config()?;

    let api_mode = match env_var("API_MODE") {
        Some(raw) => raw.parse::<ApiMode>()?,
        None => ApiMode::default(),
    };

    Ok(ServerConfig {
        host: env_var_or("HOST", DEFAULT_HOST),
        port: env_parse("PORT")?.unwrap_or(DEFAULT_PORT),
        tls,
        api_mode,

        realtime_session_url: env_var("AZURE_GPT_REALTIME_URL"),
        webrtc_url: env_var("WEBRTC_URL"),
        realtime_deployment: env_var_or(
            "AZURE_GPT_REALTIME_DEPLOYMENT",
            DEFAULT_REALTIME_DEPLOYMENT,
        ),
        realtime_voice: env_var_or("AZURE_GPT_REALTIME_VOICE", DEFAULT_REALTIME_VOICE),
        realtime_api_key: env_var("AZURE_GPT_REALTIME_KEY"),
        session_request_timeout_seconds: env_parse("SESSION_REQUEST_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_SESSION_REQUEST_TIMEOUT_SECONDS),

        azure_bearer_token: env_var("AZURE_BEARER_TOKEN"),

        voice_live_endpoint: env_var("VOICE_LIVE_WEBSOCKET_ENDPOINT"),
        voice_live_api_key: env_var("VOICE_LIVE_API_KEY"),
        voice_live_model: env_var_or("VOICE_LIVE_MODEL", DEFAULT_VOICE_LIVE_MODEL),
        voice_live_voice: env_var_or("VOICE_LIVE_VOICE", DEFAULT_VOICE_LIVE_VOICE),
        voice_live_language: env_var_or("VOICE_LIVE_LANGUAGE", DEFAULT_VOICE_LIVE_LANGUAGE),
        voice_live_temperature: env_parse("VOICE_LIVE_TEMPERATURE")?
            .unwrap_or(DEFAULT_VOICE_LIVE_TEMPERATURE),
        voice_live_rate: env_var_or("VOICE_LIVE_RATE", DEFAULT_VOICE_LIVE_RATE),
        voice_live_speech_endpoint: env_var("VOICE_LIVE_SPEECH_ENDPOINT"),
        upstream_connect_timeout_seconds: env_parse("UPSTREAM_CONNECT_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS),

        frontend_dist_dir: env_var("FRONTEND_DIST_DIR").map(PathBuf::from),
        backend_base_url: env_var_or("VITE_BACKEND_BASE_URL", DEFAULT_BACKEND_BASE_URL),

        cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
    })
}

fn load_tls_config() -> Result<Option<TlsConfig>, Box<dyn std::error::Error>> {
    let enabled = match env_var("TLS_ENABLED") {
        Some(raw) => parse_bool(&raw).ok_or_else(|| format!("Invalid value for TLS_ENABLED '{raw}'"))?,
        None => false,
    };
    if !enabled {
        return Ok(None);
    }

    validation::tls_config(env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")).map(Some)
}
