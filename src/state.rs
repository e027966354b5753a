use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::config::{ApiMode, ServerConfig};
use crate::core::broker::SessionBroker;
use crate::core::relay::{RelayError, RelayResult, UpstreamTarget};
use crate::core::tools::ToolRegistry;
use crate::core::voice_live::VoiceLiveClient;

/// Process-wide state shared by all handlers.
///
/// Configuration is immutable after startup. The API mode and the scratch
/// key-value store are the only mutable pieces.
pub struct AppState {
    pub config: ServerConfig,
    pub tools: ToolRegistry,
    pub broker: Option<SessionBroker>,
    pub voice_live: Option<VoiceLiveClient>,
    api_mode: RwLock<ApiMode>,
    kv_store: DashMap<String, Value>,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> Arc<Self> {
        Self::with_tools(config, ToolRegistry::new()).await
    }

    pub async fn with_tools(config: ServerConfig, tools: ToolRegistry) -> Arc<Self> {
        let broker = match (&config.realtime_session_url, config.realtime_credential()) {
            (Some(url), Ok(credential)) => {
                match SessionBroker::new(url.clone(), credential, config.session_request_timeout())
                {
                    Ok(broker) => Some(broker),
                    Err(e) => {
                        warn!(error = %e, "Failed to build realtime session client");
                        None
                    }
                }
            }
            _ => {
                info!("GPT Realtime session broker not configured");
                None
            }
        };

        let voice_live = match (
            &config.voice_live_speech_endpoint,
            &config.voice_live_api_key,
        ) {
            (Some(endpoint), Some(key)) => Some(VoiceLiveClient::new(
                endpoint.clone(),
                key.clone(),
                config.voice_live_voice.clone(),
            )),
            _ => None,
        };

        if config.voice_live_available() {
            info!(model = %config.voice_live_model, "Voice Live relay configured");
        } else {
            info!("Voice Live relay not configured");
        }

        let api_mode = RwLock::new(config.api_mode);

        Arc::new(Self {
            config,
            tools,
            broker,
            voice_live,
            api_mode,
            kv_store: DashMap::new(),
        })
    }

    pub fn api_mode(&self) -> ApiMode {
        *self.api_mode.read()
    }

    /// Switch the active mode if its backend is configured.
    pub fn set_api_mode(&self, mode: ApiMode) -> Result<ApiMode, String> {
        match mode {
            ApiMode::VoiceLive if !self.config.voice_live_available() => {
                return Err("Voice Live API not configured".to_string());
            }
            ApiMode::Realtime if !self.config.realtime_available() => {
                return Err("GPT Realtime API not configured".to_string());
            }
            _ => {}
        }
        *self.api_mode.write() = mode;
        info!(mode = %mode, "API mode changed");
        Ok(mode)
    }

    /// Upstream target for a new Voice Live relay session.
    ///
    /// Returns `Ok(None)` when Voice Live is not configured.
    pub fn voice_live_target(&self) -> RelayResult<Option<UpstreamTarget>> {
        let Some(endpoint) = &self.config.voice_live_endpoint else {
            return Ok(None);
        };
        let Ok(credential) = self.config.voice_live_credential() else {
            return Ok(None);
        };

        let url = upstream_url(endpoint, &self.config.voice_live_model)?;
        Ok(Some(
            UpstreamTarget::new(url, credential)
                .with_connect_timeout(self.config.upstream_connect_timeout()),
        ))
    }

    pub fn kv_get(&self, key: &str) -> Option<Value> {
        self.kv_store.get(key).map(|entry| entry.value().clone())
    }

    pub fn kv_set(&self, key: impl Into<String>, value: Value) {
        self.kv_store.insert(key.into(), value);
    }

    pub fn kv_delete(&self, key: &str) {
        self.kv_store.remove(key);
    }
}

/// Append `model=<model>` to the configured endpoint, keeping its query.
pub fn upstream_url(endpoint: &str, model: &str) -> RelayResult<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| RelayError::InvalidUpstreamUrl(e.to_string()))?;
    url.query_pairs_mut().append_pair("model", model);
    Ok(url)
}
