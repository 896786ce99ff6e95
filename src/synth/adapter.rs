//! `SpeechSynthesizer` trait and the HTTP adapter.
//!
//! `HttpSynthesizer` posts to any OpenAI-compatible `/v1/audio/speech`
//! endpoint and returns the response body as an MP3 [`AudioClip`]. One
//! attempt per call, no retry; the per-request timeout comes from
//! [`SynthesisConfig`] and is baked into the reqwest client.

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::{AudioClip, AudioFormat};
use crate::config::SynthesisConfig;

// ---------------------------------------------------------------------------
// AccentRegion
// ---------------------------------------------------------------------------

/// Locale tag selecting which accent the reference audio is spoken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentRegion {
    /// British English — the RP scoring target.
    EnGb,
    /// American English.
    EnUs,
}

impl AccentRegion {
    /// BCP-47 style tag sent to the synthesis service.
    pub fn tag(&self) -> &'static str {
        match self {
            AccentRegion::EnGb => "en-GB",
            AccentRegion::EnUs => "en-US",
        }
    }

    /// Parse a configured tag; unknown tags fall back to British English,
    /// the course's scoring target.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "en-US" => AccentRegion::EnUs,
            _ => AccentRegion::EnGb,
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// Errors that can occur while synthesizing speech.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Callers must not ask the service to speak nothing.
    #[error("synthesis text is empty")]
    EmptyText,

    /// HTTP transport or connection error.
    #[error("synthesis request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("synthesis request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("synthesis service error (HTTP {status}): {detail}")]
    Http { status: u16, detail: String },

    /// The service answered 200 with an empty body.
    #[error("synthesis service returned no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else {
            SynthesisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for speech synthesis backends.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn SpeechSynthesizer>` between the orchestrator and its spawned
/// tasks.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        accent: AccentRegion,
    ) -> Result<AudioClip, SynthesisError>;
}

// ---------------------------------------------------------------------------
// HttpSynthesizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/audio/speech` endpoint.
///
/// All connection details (`base_url`, `voice`, timeout) come from
/// [`SynthesisConfig`]; nothing is hardcoded.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    config: SynthesisConfig,
}

impl HttpSynthesizer {
    /// Build an `HttpSynthesizer` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`. A client that cannot be built is an error;
    /// there is no fallback client without the timeout.
    pub fn from_config(config: &SynthesisConfig) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    /// Synthesize `text` in the given accent. At most one network attempt.
    async fn synthesize(
        &self,
        text: &str,
        accent: AccentRegion,
    ) -> Result<AudioClip, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let body = serde_json::json!({
            "model":           self.config.model,
            "input":           text,
            "voice":           self.config.voice,
            "language":        accent.tag(),
            "response_format": "mp3",
        });

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        log::debug!(
            "synth: received {} bytes of {} audio",
            bytes.len(),
            accent.tag()
        );

        Ok(AudioClip::new(bytes.to_vec(), AudioFormat::Mp3))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> SynthesisConfig {
        SynthesisConfig {
            base_url: "http://127.0.0.1:1".into(),
            model: "tts-1".into(),
            voice: "alloy".into(),
            accent: "en-GB".into(),
            timeout_secs: 1,
        }
    }

    #[test]
    fn accent_tags() {
        assert_eq!(AccentRegion::EnGb.tag(), "en-GB");
        assert_eq!(AccentRegion::EnUs.tag(), "en-US");
    }

    #[test]
    fn unknown_tag_falls_back_to_british() {
        assert_eq!(AccentRegion::from_tag("en-AU"), AccentRegion::EnGb);
        assert_eq!(AccentRegion::from_tag("en-US"), AccentRegion::EnUs);
    }

    /// A well-formed config must yield a client with its timeout intact.
    #[test]
    fn from_config_builds_with_timeout() {
        assert!(HttpSynthesizer::from_config(&make_config()).is_ok());
    }

    /// Verify that `HttpSynthesizer` is object-safe.
    #[test]
    fn synthesizer_is_object_safe() {
        let synth: Box<dyn SpeechSynthesizer> =
            Box::new(HttpSynthesizer::from_config(&make_config()).expect("client"));
        drop(synth);
    }

    /// Empty text must be rejected before any network attempt.
    #[tokio::test]
    async fn empty_text_is_rejected_locally() {
        let synth = HttpSynthesizer::from_config(&make_config()).expect("client");
        let err = synth
            .synthesize("   ", AccentRegion::EnGb)
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyText));
    }

    /// An unreachable service yields a typed error, not a panic.
    #[tokio::test]
    async fn unreachable_service_yields_typed_error() {
        let synth = HttpSynthesizer::from_config(&make_config()).expect("client");
        let err = synth
            .synthesize("The car is parked.", AccentRegion::EnGb)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::Request(_) | SynthesisError::Timeout
        ));
    }
}
