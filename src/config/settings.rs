//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::lang::{Language, VoiceGender};
use crate::voice::VoiceBackend;

use super::AppPaths;

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// The farmer's voice preferences, persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Selected app language.
    pub language: Language,
    /// Gender of the AI voice (maps to a prebuilt voice identity).
    pub gender: VoiceGender,
    /// Preferred speech backend.
    pub backend: VoiceBackend,
    /// When `true`, no audio plays at all; alerts still show.
    pub muted: bool,
    /// Device TTS binary name (e.g. `"espeak-ng"`, or `"espeak"` on older
    /// systems).
    pub native_command: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            gender: VoiceGender::default(),
            backend: VoiceBackend::default(),
            muted: false,
            native_command: "espeak-ng".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SynthConfig
// ---------------------------------------------------------------------------

/// Connection settings for the generative AI service (speech synthesis and
/// the advisory calls).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Base URL of the API endpoint.
    pub base_url: String,
    /// API key — `None` for proxied or keyless deployments.
    pub api_key: Option<String>,
    /// Model identifier for speech synthesis requests.
    pub tts_model: String,
    /// Model identifier for chat / analysis requests.
    pub chat_model: String,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            chat_model: "gemini-3-flash-preview".into(),
            timeout_secs: 20,
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
/// use agrovoice::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Voice preferences.
    pub voice: VoiceConfig,
    /// AI service connection settings.
    pub synth: SynthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            synth: SynthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
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
