use std::path::PathBuf;

use super::env::load_env_config;
use super::utils::non_empty;
use super::validation;
use super::yaml::YamlConfig;
use super::{ApiMode, ServerConfig};

/// Load the environment configuration and apply YAML overrides on top.
///
/// Only values present in the YAML replace environment values. Empty YAML
/// strings are ignored so a blank placeholder never erases a real secret.
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = load_env_config()?;
    if let Some(yaml) = yaml {
        apply_yaml(&mut config, yaml)?;
    }
    Ok(config)
}

fn apply_yaml(config: &mut ServerConfig, yaml: YamlConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(server) = yaml.server {
        if let Some(host) = non_empty(server.host) {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(mode) = non_empty(server.api_mode) {
            config.api_mode = mode.parse::<ApiMode>()?;
        }
        if let Some(tls) = server.tls {
            match tls.enabled {
                Some(true) => {
                    let cert = non_empty(tls.cert_path).or_else(|| {
                        config.tls.as_ref().map(|t| t.cert_path.display().to_string())
                    });
                    let key = non_empty(tls.key_path).or_else(|| {
                        config.tls.as_ref().map(|t| t.key_path.display().to_string())
                    });
                    config.tls = Some(validation::tls_config(cert, key)?);
                }
                Some(false) => config.tls = None,
                None => {}
            }
        }
    }

    if let Some(realtime) = yaml.realtime {
        override_opt(&mut config.realtime_session_url, realtime.session_url);
        override_opt(&mut config.webrtc_url, realtime.webrtc_url);
        override_str(&mut config.realtime_deployment, realtime.deployment);
        override_str(&mut config.realtime_voice, realtime.voice);
        override_opt(&mut config.realtime_api_key, realtime.api_key);
        if let Some(timeout) = realtime.request_timeout_seconds {
            config.session_request_timeout_seconds = timeout;
        }
    }

    if let Some(auth) = yaml.auth {
        override_opt(&mut config.azure_bearer_token, auth.bearer_token);
    }

    if let Some(voice_live) = yaml.voice_live {
        override_opt(&mut config.voice_live_endpoint, voice_live.endpoint);
        override_opt(&mut config.voice_live_api_key, voice_live.api_key);
        override_str(&mut config.voice_live_model, voice_live.model);
        override_str(&mut config.voice_live_voice, voice_live.voice);
        override_str(&mut config.voice_live_language, voice_live.language);
        if let Some(temperature) = voice_live.temperature {
            config.voice_live_temperature = temperature;
        }
        override_str(&mut config.voice_live_rate, voice_live.rate);
        override_opt(
            &mut config.voice_live_speech_endpoint,
            voice_live.speech_endpoint,
        );
        if let Some(timeout) = voice_live.connect_timeout_seconds {
            config.upstream_connect_timeout_seconds = timeout;
        }
    }

    if let Some(frontend) = yaml.frontend {
        if let Some(dir) = non_empty(frontend.dist_dir) {
            config.frontend_dist_dir = Some(PathBuf::from(dir));
        }
        override_str(&mut config.backend_base_url, frontend.backend_base_url);
    }

    if let Some(security) = yaml.security {
        override_opt(&mut config.cors_allowed_origins, security.cors_allowed_origins);
    }

    Ok(())
}

fn override_opt(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = non_empty(value) {
        *target = Some(value);
    }
}

fn override_str(target: &mut String, value: Option<String>) {
    if let Some(value) = non_empty(value) {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::yaml::{RealtimeYaml, ServerYaml, TlsYaml};

    #[test]
    fn test_apply_yaml_overrides_only_present_values() {
        let mut config = ServerConfig::default();
        config.realtime_api_key = Some("env-key".into());

        let yaml = YamlConfig {
            realtime: Some(RealtimeYaml {
                deployment: Some("yaml-deployment".into()),
                api_key: Some("".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        apply_yaml(&mut config, yaml).unwrap();
        assert_eq!(config.realtime_deployment, "yaml-deployment");
        assert_eq!(config.realtime_api_key.as_deref(), Some("env-key"));
        assert_eq!(config.realtime_voice, "alloy");
    }

    #[test]
    fn test_apply_yaml_tls() {
        let mut config = ServerConfig::default();
        let yaml = YamlConfig {
            server: Some(ServerYaml {
                tls: Some(TlsYaml {
                    enabled: Some(true),
                    cert_path: Some("/tmp/cert.pem".into()),
                    key_path: Some("/tmp/key.pem".into()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        apply_yaml(&mut config, yaml).unwrap();
        let tls = config.tls.as_ref().unwrap();
        assert_eq!(tls.cert_path, PathBuf::from("/tmp/cert.pem"));
    }

    #[test]
    fn test_apply_yaml_tls_missing_key() {
        let mut config = ServerConfig::default();
        let yaml = YamlConfig {
            server: Some(ServerYaml {
                tls: Some(TlsYaml {
                    enabled: Some(true),
                    cert_path: Some("/tmp/cert.pem".into()),
                    key_path: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(apply_yaml(&mut config, yaml).is_err());
    }
}
