//! Core `AccentAnalyzer` trait and `GeminiAnalyzer` implementation.
//!
//! `GeminiAnalyzer` makes exactly one `generateContent` round-trip per
//! call: the audio clip is inlined as base64 alongside the instruction
//! text, and the model's free-form critique comes back verbatim. No
//! batching, no streaming, no retry. All connection details come from
//! [`AnalysisConfig`]; the credential is supplied per call and is sent as
//! a header so it never appears in URLs or logs.

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;

use crate::audio::AudioClip;
use crate::config::AnalysisConfig;

use super::report::AnalysisReport;

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Errors that can occur during remote accent analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The caller supplied an empty credential. Checked before any
    /// network I/O.
    #[error("no API credential supplied")]
    MissingCredential,

    /// HTTP transport or connection error.
    #[error("analysis request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("analysis request timed out")]
    Timeout,

    /// The service answered with a non-success status (quota, auth
    /// rejection, bad request). The detail is displayed, never parsed.
    #[error("analysis service error (HTTP {status}): {detail}")]
    Http { status: u16, detail: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse analysis response: {0}")]
    Parse(String),

    /// The model returned a response with no usable text content.
    #[error("analysis service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisError::Timeout
        } else {
            AnalysisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AccentAnalyzer trait
// ---------------------------------------------------------------------------

/// Async trait for remote accent analysis backends.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn AccentAnalyzer>` between the orchestrator and its spawned
/// tasks.
///
/// # Arguments
/// * `credential`  – caller-supplied API key; empty fails with
///   [`AnalysisError::MissingCredential`] before any network call.
/// * `clip`        – the recorded attempt, consumed by this call.
/// * `instruction` – grading instruction from
///   [`InstructionBuilder`](super::InstructionBuilder).
#[async_trait]
pub trait AccentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        credential: &str,
        clip: &AudioClip,
        instruction: &str,
    ) -> Result<AnalysisReport, AnalysisError>;
}

// ---------------------------------------------------------------------------
// GeminiAnalyzer
// ---------------------------------------------------------------------------

/// Calls the hosted Gemini `generateContent` endpoint with inline audio.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    config: AnalysisConfig,
}

impl GeminiAnalyzer {
    /// Build a `GeminiAnalyzer` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs` (default 30 s). A client that cannot be
    /// built is an error; there is no fallback client without the
    /// timeout.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
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
impl AccentAnalyzer for GeminiAnalyzer {
    /// Send one attempt for grading and return the critique verbatim.
    async fn analyze(
        &self,
        credential: &str,
        clip: &AudioClip,
        instruction: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        if credential.is_empty() {
            return Err(AnalysisError::MissingCredential);
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        // Inline the audio to avoid a separate upload round-trip.
        let encoded = base64::engine::general_purpose::STANDARD.encode(&clip.bytes);

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": clip.format.mime_type(),
                            "data": encoded,
                        }
                    },
                    { "text": instruction }
                ]
            }]
        });

        log::debug!(
            "analysis: sending {} bytes of {} with a {}-char instruction",
            clip.len(),
            clip.format.mime_type(),
            instruction.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(AnalysisError::EmptyResponse)?
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        Ok(AnalysisReport::new(text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioClip;

    fn make_config() -> AnalysisConfig {
        AnalysisConfig {
            // Unroutable: a request that reaches the network fails as
            // Request/Timeout, so MissingCredential proves no call was made.
            base_url: "http://127.0.0.1:1".into(),
            model: "gemini-1.5-flash".into(),
            timeout_secs: 1,
        }
    }

    /// A well-formed config must yield a client with its timeout intact.
    #[test]
    fn from_config_builds_with_timeout() {
        assert!(GeminiAnalyzer::from_config(&make_config()).is_ok());
    }

    /// Verify that `GeminiAnalyzer` is object-safe.
    #[test]
    fn analyzer_is_object_safe() {
        let analyzer: Box<dyn AccentAnalyzer> =
            Box::new(GeminiAnalyzer::from_config(&make_config()).expect("client"));
        drop(analyzer);
    }

    /// An empty credential must fail before any network call.
    #[tokio::test]
    async fn empty_credential_never_reaches_network() {
        let analyzer = GeminiAnalyzer::from_config(&make_config()).expect("client");
        let clip = AudioClip::captured_wav(vec![0u8; 64]);

        let err = analyzer.analyze("", &clip, "grade this").await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential));
    }

    /// With a credential present, an unreachable service yields a typed
    /// transport error.
    #[tokio::test]
    async fn unreachable_service_yields_typed_error() {
        let analyzer = GeminiAnalyzer::from_config(&make_config()).expect("client");
        let clip = AudioClip::captured_wav(vec![0u8; 64]);

        let err = analyzer
            .analyze("key-123", &clip, "grade this")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Request(_) | AnalysisError::Timeout
        ));
    }
}
