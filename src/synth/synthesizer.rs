//! Core `SpeechSynthesizer` trait and the HTTP implementation.
//!
//! `HttpSynthesizer` calls a Gemini-style `models/{model}:generateContent`
//! endpoint with an audio response modality and returns the base64 payload.
//! All connection details come from [`SynthConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SynthConfig;

// ---------------------------------------------------------------------------
// SynthError
// ---------------------------------------------------------------------------

/// Errors that can occur during network speech synthesis.
///
/// The `Display` text is what the quota breaker inspects for rate-limit
/// markers, so HTTP failures keep the status line (`HTTP 429 …`) intact.
#[derive(Debug, Error)]
pub enum SynthError {
    /// HTTP transport failure or non-success status.
    #[error("synthesis request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("synthesis request timed out")]
    Timeout,

    /// The response body could not be parsed as expected JSON.
    #[error("failed to parse synthesis response: {0}")]
    Parse(String),

    /// The response carried no audio payload.
    #[error("synthesis returned no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for SynthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthError::Timeout
        } else {
            SynthError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for network speech synthesis.
///
/// Implementors must be `Send + Sync` so the orchestrator can hold them as
/// `Arc<dyn SpeechSynthesizer>` across spawned tasks.
///
/// # Arguments
/// * `text`  – What to say.
/// * `voice` – Prebuilt voice identity (see
///   [`crate::lang::VoiceGender::voice_identity`]).
///
/// Returns the base64-encoded PCM payload; decoding is the caller's concern
/// (see [`crate::synth::decode_pcm16`]).
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<String, SynthError>;
}

// ---------------------------------------------------------------------------
// HttpSynthesizer
// ---------------------------------------------------------------------------

/// Calls a Gemini-style TTS `generateContent` endpoint.
///
/// # No hardcoded URLs
/// `base_url`, `api_key`, `model` and the timeout come exclusively from the
/// [`SynthConfig`] passed to [`HttpSynthesizer::from_config`].
pub struct HttpSynthesizer {
    client: reqwest::Client,
    config: SynthConfig,
}

impl HttpSynthesizer {
    /// Build an `HttpSynthesizer` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &SynthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<String, SynthError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.tts_model
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": format!("Say: {text}") }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                }
            }
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.header("x-goog-api-key", key);
        }

        let response = req.send().await?;

        // Keep the status line in the error text; the breaker sniffs it for
        // "429" to detect quota exhaustion.
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SynthError::Request(format!("HTTP {status}: {detail}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SynthError::Parse(e.to_string()))?;

        let encoded = json["candidates"][0]["content"]["parts"][0]["inlineData"]["data"]
            .as_str()
            .ok_or(SynthError::EmptyAudio)?
            .to_string();

        if encoded.is_empty() {
            return Err(SynthError::EmptyAudio);
        }

        Ok(encoded)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> SynthConfig {
        SynthConfig {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: api_key.map(|s| s.to_string()),
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            chat_model: "gemini-3-flash-preview".into(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _synth = HttpSynthesizer::from_config(&make_config(None));
    }

    #[test]
    fn from_config_accepts_empty_api_key() {
        let _synth = HttpSynthesizer::from_config(&make_config(Some("")));
    }

    /// `HttpSynthesizer` must be usable as `dyn SpeechSynthesizer`.
    #[test]
    fn synthesizer_is_object_safe() {
        let synth: Box<dyn SpeechSynthesizer> =
            Box::new(HttpSynthesizer::from_config(&make_config(None)));
        drop(synth);
    }

    /// Rate-limit statuses must survive into the error text so the breaker
    /// can classify them.
    #[test]
    fn request_error_display_keeps_status() {
        let err = SynthError::Request("HTTP 429 Too Many Requests: quota".into());
        assert!(crate::quota::is_rate_limit(&err.to_string()));
    }
}
