//! AI speech synthesis — network call, payload decode, session cache.
//!
//! This module provides:
//! * [`SpeechSynthesizer`] — async trait implemented by synthesis backends.
//! * [`HttpSynthesizer`] — Gemini-style REST implementation.
//! * [`decode_pcm16`] / [`AudioClip`] — base64 → 16-bit PCM → normalised
//!   `f32` samples at 24 kHz mono.
//! * [`AudioResponseCache`] — session-scoped memo keyed by
//!   `(language, voice, text)`.
//! * [`SynthError`] / [`DecodeError`] — error variants.

pub mod cache;
pub mod decode;
pub mod synthesizer;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cache::AudioResponseCache;
pub use decode::{decode_pcm16, AudioClip, DecodeError, TTS_SAMPLE_RATE};
pub use synthesizer::{HttpSynthesizer, SpeechSynthesizer, SynthError};
