//! AgroVoice — voice arbitration layer for a farmer-facing crop advisory app.
//!
//! The app lets a farmer photograph a crop leaf, hear an AI diagnosis read
//! aloud, and chat with an expert.  This crate is the engineering core that
//! sits between the UI and the generative AI service:
//!
//! * [`quota`] — client-side circuit breaker that detects upstream quota
//!   exhaustion and suppresses further calls for a cooldown window.
//! * [`synth`] — network speech synthesis, PCM decoding, and the
//!   session-scoped audio cache.
//! * [`playback`] — the two playback mechanisms (device TTS, decoded-buffer
//!   sink) and the arbiter that guarantees at most one is audible.
//! * [`voice`] — the `speak` façade: alerts, muting, backend selection,
//!   quota-aware fallback.
//! * [`advisor`] — guarded non-voice AI calls (chat, leaf analysis) that
//!   propagate quota errors as typed values.
//! * [`config`] / [`lang`] — settings persistence and the three supported
//!   locales.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agrovoice::config::AppConfig;
//! use agrovoice::playback::{BufferPlayer, CpalSink, EspeakVoice, NativeVoice, PlaybackArbiter};
//! use agrovoice::quota::QuotaBreaker;
//! use agrovoice::synth::{AudioResponseCache, HttpSynthesizer, SpeechSynthesizer};
//! use agrovoice::voice::{VoiceBackend, VoiceOrchestrator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!
//!     let arbiter = Arc::new(PlaybackArbiter::new(
//!         Arc::new(EspeakVoice::new()) as Arc<dyn NativeVoice>,
//!         Arc::new(CpalSink::spawn()) as Arc<dyn BufferPlayer>,
//!     ));
//!     let orchestrator = VoiceOrchestrator::new(
//!         Arc::new(QuotaBreaker::new()),
//!         Arc::new(AudioResponseCache::new()),
//!         arbiter,
//!         Arc::new(HttpSynthesizer::from_config(&config.synth)) as Arc<dyn SpeechSynthesizer>,
//!     );
//!
//!     orchestrator.speak(
//!         "Scan complete",
//!         VoiceBackend::Ai,
//!         config.voice.language,
//!         config.voice.gender,
//!         config.voice.muted,
//!     );
//! }
//! ```

pub mod advisor;
pub mod config;
pub mod lang;
pub mod playback;
pub mod quota;
pub mod synth;
pub mod voice;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use lang::{Language, VoiceGender};
pub use quota::{GuardError, QuotaBreaker};
pub use voice::{VoiceBackend, VoiceOrchestrator};
