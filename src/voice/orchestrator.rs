//! The `speak` façade.
//!
//! [`VoiceOrchestrator`] is the single entry point the rest of the app uses
//! to say something out loud.  It hides backend selection, muting, quota
//! state, caching and fallback from callers: `speak` never returns an
//! error, and the alert text is the one guaranteed observable side effect.
//!
//! # Precedence
//!
//! 1. The transient alert is always updated, mute or not.
//! 2. Muted ⇒ no audio at all.
//! 3. `System` backend ⇒ device speech.
//! 4. `Ai` backend ⇒ breaker check → cache → guarded network synthesis →
//!    decode → cache → play; **every** failure on that path degrades to
//!    device speech with the same text.  AI speech failure never produces
//!    silence or a dead end.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::lang::{Language, VoiceGender};
use crate::playback::PlaybackArbiter;
use crate::quota::QuotaBreaker;
use crate::synth::{decode_pcm16, AudioResponseCache, SpeechSynthesizer};
use crate::voice::alert::AlertFeed;

// ---------------------------------------------------------------------------
// VoiceBackend
// ---------------------------------------------------------------------------

/// Which speech-production mechanism a `speak` call asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceBackend {
    /// On-device synthesis.
    System,
    /// Network-generated AI audio (falls back to `System` on any failure).
    Ai,
}

impl Default for VoiceBackend {
    fn default() -> Self {
        VoiceBackend::System
    }
}

// ---------------------------------------------------------------------------
// VoiceOrchestrator
// ---------------------------------------------------------------------------

/// Owns the voice subsystem: breaker, cache, arbiter, synthesizer, alert.
///
/// Construct one per process (or per test) and share it behind `Arc`.
/// `speak` must be called inside a Tokio runtime — the AI path runs as a
/// spawned task so the caller never blocks on network I/O.
pub struct VoiceOrchestrator {
    breaker: Arc<QuotaBreaker>,
    cache: Arc<AudioResponseCache>,
    arbiter: Arc<PlaybackArbiter>,
    synth: Arc<dyn SpeechSynthesizer>,
    alert: AlertFeed,
}

impl VoiceOrchestrator {
    pub fn new(
        breaker: Arc<QuotaBreaker>,
        cache: Arc<AudioResponseCache>,
        arbiter: Arc<PlaybackArbiter>,
        synth: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            breaker,
            cache,
            arbiter,
            synth,
            alert: AlertFeed::new(),
        }
    }

    /// Say `text` out loud (fire-and-forget) and surface it as a transient
    /// alert.
    ///
    /// Never returns an error to the caller; all failure paths degrade to
    /// device speech or, when muted, to the alert alone.
    pub fn speak(
        &self,
        text: &str,
        backend: VoiceBackend,
        language: Language,
        gender: VoiceGender,
        muted: bool,
    ) {
        self.alert.announce(text);

        // Muting is absolute: checked before any backend dispatch.
        if muted {
            return;
        }

        match backend {
            VoiceBackend::System => self.arbiter.speak_native(text, language),
            VoiceBackend::Ai => {
                let breaker = Arc::clone(&self.breaker);
                let cache = Arc::clone(&self.cache);
                let arbiter = Arc::clone(&self.arbiter);
                let synth = Arc::clone(&self.synth);
                let text = text.to_string();
                tokio::spawn(async move {
                    ai_speech(breaker, cache, arbiter, synth, text, language, gender).await;
                });
            }
        }
    }

    /// Immediate silence plus alert clear — the navigation path.
    pub fn stop_all(&self) {
        self.arbiter.stop();
        self.alert.clear();
    }

    /// Polled by the UI (once per second) to render the cooldown indicator.
    pub fn is_quota_limited(&self) -> bool {
        self.breaker.is_limited()
    }

    /// Milliseconds left in the quota cooldown, or 0.
    pub fn remaining_cooldown_ms(&self) -> u64 {
        self.breaker.remaining_cooldown().as_millis() as u64
    }

    /// Alert stream for the UI overlay.
    pub fn alerts(&self) -> watch::Receiver<Option<String>> {
        self.alert.subscribe()
    }

    /// Text currently showing in the alert overlay, if any.
    pub fn current_alert(&self) -> Option<String> {
        self.alert.current()
    }
}

/// The AI speech path, run as a spawned task.
///
/// Every failure — open breaker, quota exhaustion, network error, decode
/// error, playback refusing to start — falls back to device speech with the
/// same text.  Quota errors
/// are never surfaced to the user through the voice path; only the visible
/// cooldown indicator reflects them.
async fn ai_speech(
    breaker: Arc<QuotaBreaker>,
    cache: Arc<AudioResponseCache>,
    arbiter: Arc<PlaybackArbiter>,
    synth: Arc<dyn SpeechSynthesizer>,
    text: String,
    language: Language,
    gender: VoiceGender,
) {
    if breaker.is_limited() {
        log::debug!("quota cooldown active; using device speech");
        arbiter.speak_native(&text, language);
        return;
    }

    let voice = gender.voice_identity();

    if let Some(clip) = cache.get(language, voice, &text) {
        if !arbiter.play_clip(clip) {
            arbiter.speak_native(&text, language);
        }
        return;
    }

    let decoded = match breaker.guard(|| synth.synthesize(&text, voice)).await {
        Ok(encoded) => match decode_pcm16(&encoded) {
            Ok(clip) => Some(Arc::new(clip)),
            Err(e) => {
                log::warn!("failed to decode AI speech: {e}");
                None
            }
        },
        Err(e) => {
            log::warn!("AI speech synthesis failed: {e}");
            None
        }
    };

    match decoded {
        Some(clip) => {
            cache.put(language, voice, &text, Arc::clone(&clip));
            // A clip that refuses to start (no device, unsupported config)
            // still must not end in silence.
            if !arbiter.play_clip(clip) {
                arbiter.speak_native(&text, language);
            }
        }
        None => arbiter.speak_native(&text, language),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
