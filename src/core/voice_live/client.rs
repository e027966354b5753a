//! REST client for the Azure Speech endpoints used alongside Voice Live.

use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};
use zeroize::Zeroizing;

use super::ssml::{SsmlOptions, generate_ssml, is_ssml};

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
pub const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
pub const OUTPUT_FORMAT: &str = "audio-24khz-96kbitrate-mono-mp3";
pub const SSML_CONTENT_TYPE: &str = "application/ssml+xml";

pub const SYNTHESIZE_TIMEOUT: Duration = Duration::from_secs(30);
pub const VOICES_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum VoiceLiveError {
    #[error("Speech request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Speech service returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },
}

pub type VoiceLiveResult<T> = Result<T, VoiceLiveError>;

/// Parameters for one synthesis request.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Voice override; the client default is used when `None`
    pub voice: Option<String>,
    /// Wrap the text in SSML unless it already is a `<speak>` document
    pub use_ssml: bool,
    pub rate: String,
    pub pitch: String,
    pub language: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            voice: None,
            use_ssml: true,
            rate: "medium".to_string(),
            pitch: "medium".to_string(),
            language: "pt-PT".to_string(),
        }
    }
}

/// Client for text-to-speech synthesis and voice listing.
pub struct VoiceLiveClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Zeroizing<String>,
    default_voice: String,
}

impl VoiceLiveClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        default_voice: impl Into<String>,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: Zeroizing::new(api_key.into()),
            default_voice: default_voice.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    /// Build the request body: SSML when requested, otherwise the raw text.
    pub fn request_body(&self, text: &str, options: &SynthesisOptions) -> String {
        if !options.use_ssml || is_ssml(text) {
            return text.to_string();
        }
        let ssml_options = SsmlOptions {
            voice: options
                .voice
                .clone()
                .unwrap_or_else(|| self.default_voice.clone()),
            language: options.language.clone(),
            rate: options.rate.clone(),
            pitch: options.pitch.clone(),
        };
        generate_ssml(text, &ssml_options)
    }

    /// Synthesize speech and return MP3 bytes.
    pub async fn synthesize(&self, text: &str, options: &SynthesisOptions) -> VoiceLiveResult<Bytes> {
        let body = self.request_body(text, options);
        let url = format!("{}/cognitiveservices/v1", self.endpoint);

        debug!(chars = text.len(), ssml = options.use_ssml, "Synthesizing speech");

        let response = self
            .client
            .post(&url)
            .timeout(SYNTHESIZE_TIMEOUT)
            .header(SUBSCRIPTION_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::CONTENT_TYPE, SSML_CONTENT_TYPE)
            .header(OUTPUT_FORMAT_HEADER, OUTPUT_FORMAT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Speech synthesis failed");
            return Err(VoiceLiveError::Upstream { status, body });
        }

        let audio = response.bytes().await?;
        debug!(bytes = audio.len(), "Speech synthesized");
        Ok(audio)
    }

    /// List voices, optionally filtered by locale prefix.
    pub async fn list_voices(&self, language: Option<&str>) -> VoiceLiveResult<Vec<Value>> {
        let url = format!("{}/cognitiveservices/voices/list", self.endpoint);

        let response = self
            .client
            .get(&url)
            .timeout(VOICES_TIMEOUT)
            .header(SUBSCRIPTION_KEY_HEADER, self.api_key.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Voice listing failed");
            return Err(VoiceLiveError::Upstream { status, body });
        }

        let voices: Vec<Value> = response.json().await?;
        Ok(filter_by_locale(voices, language))
    }
}

impl std::fmt::Debug for VoiceLiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceLiveClient")
            .field("endpoint", &self.endpoint)
            .field("default_voice", &self.default_voice)
            .finish_non_exhaustive()
    }
}

/// Keep voices whose `Locale` starts with `language`.
pub fn filter_by_locale(voices: Vec<Value>, language: Option<&str>) -> Vec<Value> {
    match language.filter(|l| !l.is_empty()) {
        None => voices,
        Some(language) => voices
            .into_iter()
            .filter(|voice| {
                voice
                    .get("Locale")
                    .and_then(Value::as_str)
                    .is_some_and(|locale| locale.starts_with(language))
            })
            .collect(),
    }
}
