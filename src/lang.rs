//! Supported languages and voice selection.
//!
//! The app ships with exactly three locales.  Anything a caller can select
//! is a [`Language`] variant, so an unmapped locale tag is impossible by
//! construction rather than a runtime fallback.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// The three languages the app is localised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Marathi,
    Hindi,
    English,
}

impl Language {
    /// BCP-47 locale tag passed to the device speech synthesizer.
    pub fn locale_tag(&self) -> &'static str {
        match self {
            Language::Marathi => "mr-IN",
            Language::Hindi => "hi-IN",
            Language::English => "en-US",
        }
    }

    /// Human-readable name, used by the demo binary's `/lang` command.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Marathi => "Marathi",
            Language::Hindi => "Hindi",
            Language::English => "English",
        }
    }

    /// Parse a user-entered language name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "marathi" | "mr" => Some(Language::Marathi),
            "hindi" | "hi" => Some(Language::Hindi),
            "english" | "en" => Some(Language::English),
            _ => None,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Marathi
    }
}

// ---------------------------------------------------------------------------
// VoiceGender
// ---------------------------------------------------------------------------

/// Which prebuilt AI voice to synthesize with.
///
/// The upstream TTS service exposes named voices; the profile only stores a
/// gender, so the mapping lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceGender {
    Male,
    Female,
}

impl VoiceGender {
    /// Prebuilt voice identity sent to the synthesis endpoint.
    pub fn voice_identity(&self) -> &'static str {
        match self {
            VoiceGender::Male => "Kore",
            VoiceGender::Female => "Puck",
        }
    }
}

impl Default for VoiceGender {
    fn default() -> Self {
        VoiceGender::Male
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
