use serde::{Deserialize, Deserializer, de};
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override the environment.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8080
///   api_mode: "voicelive"
///   tls:
///     enabled: true
///     cert_path: "/etc/relay/cert.pem"
///     key_path: "/etc/relay/key.pem"
///
/// realtime:
///   session_url: "https://res.openai.azure.com/openai/realtimeapi/sessions?api-version=2025-04-01-preview"
///   webrtc_url: "https://swedencentral.realtimeapi-preview.ai.azure.com/v1/realtimertc"
///   deployment: "gpt-realtime"
///   voice: "alloy"
///   api_key: "your-azure-key"
///   request_timeout_seconds: 15
///
/// auth:
///   bearer_token: "eyJ..."
///
/// voice_live:
///   endpoint: "wss://res.cognitiveservices.azure.com/voice-live/realtime?api-version=2025-10-01"
///   api_key: "your-voice-live-key"
///   model: "gpt-4o"
///   voice: "en-US-Ava:DragonHDLatestNeural"
///   language: "pt-PT"
///   temperature: 0.8
///   rate: 1.0
///   speech_endpoint: "https://westeurope.tts.speech.microsoft.com"
///   connect_timeout_seconds: 30
///
/// frontend:
///   dist_dir: "./dist"
///   backend_base_url: "/api"
///
/// security:
///   cors_allowed_origins: "https://example.com,https://app.example.com"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub realtime: Option<RealtimeYaml>,
    pub auth: Option<AuthYaml>,
    pub voice_live: Option<VoiceLiveYaml>,
    pub frontend: Option<FrontendYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_mode: Option<String>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// GPT Realtime (WebRTC) configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RealtimeYaml {
    pub session_url: Option<String>,
    pub webrtc_url: Option<String>,
    pub deployment: Option<String>,
    pub voice: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

/// Shared Azure auth configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthYaml {
    /// Pre-issued Entra ID token used when no API key is set
    pub bearer_token: Option<String>,
}

/// Voice Live configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VoiceLiveYaml {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub temperature: Option<f32>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub rate: Option<String>,
    pub speech_endpoint: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
}

/// Frontend hosting configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FrontendYaml {
    pub dist_dir: Option<String>,
    pub backend_base_url: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

/// Accept a YAML scalar written either as `1.2` or `"1.2"`, keeping its text.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(text)) => Ok(Some(text)),
        Some(serde_yaml::Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000
  api_mode: "voicelive"
  tls:
    enabled: true
    cert_path: "/tmp/cert.pem"
    key_path: "/tmp/key.pem"
realtime:
  session_url: "https://example.com/sessions"
  webrtc_url: "https://example.com/rtc"
  deployment: "my-deployment"
  voice: "verse"
  api_key: "rt-key"
  request_timeout_seconds: 20
auth:
  bearer_token: "token"
voice_live:
  endpoint: "wss://example.com/voice-live/realtime?api-version=2025-10-01"
  api_key: "vl-key"
  model: "gpt-4o-mini"
  voice: "pt-PT-RaquelNeural"
  language: "pt-PT"
  temperature: 0.5
  rate: 1.2
  speech_endpoint: "https://speech.example.com"
  connect_timeout_seconds: 10
frontend:
  dist_dir: "./dist"
  backend_base_url: "/api"
security:
  cors_allowed_origins: "*"
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(9000));
        assert_eq!(server.api_mode.as_deref(), Some("voicelive"));
        assert_eq!(server.tls.unwrap().enabled, Some(true));

        let realtime = config.realtime.unwrap();
        assert_eq!(realtime.deployment.as_deref(), Some("my-deployment"));
        assert_eq!(realtime.request_timeout_seconds, Some(20));

        assert_eq!(config.auth.unwrap().bearer_token.as_deref(), Some("token"));

        let voice_live = config.voice_live.unwrap();
        assert_eq!(voice_live.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(voice_live.temperature, Some(0.5));
        assert_eq!(voice_live.connect_timeout_seconds, Some(10));
        assert_eq!(voice_live.rate.as_deref(), Some("1.2"));

        assert_eq!(config.frontend.unwrap().dist_dir.as_deref(), Some("./dist"));
        assert_eq!(
            config.security.unwrap().cors_allowed_origins.as_deref(),
            Some("*")
        );
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
voice_live:
  api_key: "only-key"
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.server.is_none());
        assert!(config.realtime.is_none());
        let voice_live = config.voice_live.unwrap();
        assert_eq!(voice_live.api_key.as_deref(), Some("only-key"));
        assert!(voice_live.endpoint.is_none());
    }

    #[test]
    fn test_yaml_rate_kept_as_text() {
        let yaml = "voice_live:\n  rate: \"0.9\"\n";
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.voice_live.unwrap().rate.as_deref(), Some("0.9"));

        let yaml = "voice_live:\n  rate: [1]\n";
        assert!(serde_yaml::from_str::<YamlConfig>(yaml).is_err());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.voice_live.is_none());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "server:\n  host: \"localhost\"\n  port: 3000\n").unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();
        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("localhost"));
        assert_eq!(server.port, Some(3000));
    }

    #[test]
    fn test_from_file_not_found() {
        let path = PathBuf::from("/nonexistent/config.yaml");
        let result = YamlConfig::from_file(&path);

        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");

        fs::write(&config_path, "invalid: yaml: content:").unwrap();

        let result = YamlConfig::from_file(&config_path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }
}
