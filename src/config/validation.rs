use std::path::PathBuf;
use url::Url;

use super::{ServerConfig, TlsConfig};

/// Build a TLS configuration, requiring both the certificate and key paths.
pub fn tls_config(
    cert_path: Option<String>,
    key_path: Option<String>,
) -> Result<TlsConfig, Box<dyn std::error::Error>> {
    match (cert_path, key_path) {
        (Some(cert), Some(key)) => Ok(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, _) => Err("TLS is enabled but TLS_CERT_PATH is not set".into()),
        (_, None) => Err("TLS is enabled but TLS_KEY_PATH is not set".into()),
    }
}

/// Validate a fully merged configuration.
pub fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_timeouts(config)?;
    validate_voice_live(config)?;
    validate_urls(config)?;
    Ok(())
}

fn validate_timeouts(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.upstream_connect_timeout_seconds == 0 {
        return Err("UPSTREAM_CONNECT_TIMEOUT_SECONDS must be greater than zero".into());
    }
    if config.session_request_timeout_seconds == 0 {
        return Err("SESSION_REQUEST_TIMEOUT_SECONDS must be greater than zero".into());
    }
    Ok(())
}

fn validate_voice_live(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&config.voice_live_temperature) {
        return Err(format!(
            "Voice Live temperature must be between 0.0 and 1.0, got {}",
            config.voice_live_temperature
        )
        .into());
    }
    // Kept as text for the frontend, but it must still read as a positive number
    let rate_ok = config
        .voice_live_rate
        .parse::<f32>()
        .is_ok_and(|rate| rate.is_finite() && rate > 0.0);
    if !rate_ok {
        return Err(format!(
            "Voice Live rate must be a positive number, got '{}'",
            config.voice_live_rate
        )
        .into());
    }
    Ok(())
}

fn validate_urls(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(endpoint) = &config.voice_live_endpoint {
        let url = Url::parse(endpoint)
            .map_err(|e| format!("Invalid VOICE_LIVE_WEBSOCKET_ENDPOINT '{endpoint}': {e}"))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(format!(
                "VOICE_LIVE_WEBSOCKET_ENDPOINT must use ws:// or wss://, got '{}'",
                url.scheme()
            )
            .into());
        }
    }
    for (name, value) in [
        ("AZURE_GPT_REALTIME_URL", &config.realtime_session_url),
        ("VOICE_LIVE_SPEECH_ENDPOINT", &config.voice_live_speech_endpoint),
    ] {
        if let Some(value) = value {
            Url::parse(value).map_err(|e| format!("Invalid {name} '{value}': {e}"))?;
        }
    }
    Ok(())
}
