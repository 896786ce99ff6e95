//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across
//! threads. The API credential is deliberately NOT part of the settings:
//! it is supplied per session and held only in memory.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Settings for the remote accent-analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Base URL of the hosted model API.
    pub base_url: String,
    /// Model identifier sent in the request path.
    pub model: String,
    /// Maximum seconds to wait for an analysis response.
    ///
    /// The original tool imposed no timeout at all; 30 s is a policy
    /// choice, not an inherited constant.
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-1.5-flash".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-synthesis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Base URL of an OpenAI-compatible `/v1/audio/speech` endpoint.
    pub base_url: String,
    /// Synthesis model identifier.
    pub model: String,
    /// Voice name sent to the service.
    pub voice: String,
    /// Accent tag for reference audio (`"en-GB"` or `"en-US"`).
    pub accent: String,
    /// Maximum seconds to wait for synthesized audio.
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "tts-1".into(),
            voice: "alloy".into(),
            accent: "en-GB".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// FeedbackConfig
// ---------------------------------------------------------------------------

/// Settings for spoken feedback of the critique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Maximum characters of the critique that are re-spoken.
    pub speak_limit_chars: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            speak_limit_chars: 220,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use accent_coach::config::AppConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote analysis settings.
    pub analysis: AnalysisConfig,
    /// Speech synthesis settings.
    pub synthesis: SynthesisConfig,
    /// Spoken feedback settings.
    pub feedback: FeedbackConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` survives a TOML round trip.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.analysis.base_url, loaded.analysis.base_url);
        assert_eq!(original.analysis.model, loaded.analysis.model);
        assert_eq!(original.analysis.timeout_secs, loaded.analysis.timeout_secs);

        assert_eq!(original.synthesis.base_url, loaded.synthesis.base_url);
        assert_eq!(original.synthesis.voice, loaded.synthesis.voice);
        assert_eq!(original.synthesis.accent, loaded.synthesis.accent);
        assert_eq!(
            original.synthesis.timeout_secs,
            loaded.synthesis.timeout_secs
        );

        assert_eq!(
            original.feedback.speak_limit_chars,
            loaded.feedback.speak_limit_chars
        );
    }

    /// `load_from` on a non-existent path must return `Default`.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.analysis.model, default.analysis.model);
        assert_eq!(config.synthesis.accent, default.synthesis.accent);
        assert_eq!(
            config.feedback.speak_limit_chars,
            default.feedback.speak_limit_chars
        );
    }

    /// Verify default policy values.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.analysis.model, "gemini-1.5-flash");
        assert_eq!(cfg.analysis.timeout_secs, 30);
        assert_eq!(cfg.synthesis.accent, "en-GB");
        assert_eq!(cfg.synthesis.timeout_secs, 10);
        assert_eq!(cfg.feedback.speak_limit_chars, 220);
    }

    /// Modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.analysis.base_url = "https://example.test".into();
        cfg.analysis.timeout_secs = 60;
        cfg.synthesis.accent = "en-US".into();
        cfg.feedback.speak_limit_chars = 80;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.analysis.base_url, "https://example.test");
        assert_eq!(loaded.analysis.timeout_secs, 60);
        assert_eq!(loaded.synthesis.accent, "en-US");
        assert_eq!(loaded.feedback.speak_limit_chars, 80);
    }
}
