//! Audio output — device speech, buffer playback, and the arbiter that
//! guarantees at most one of them is audible at a time.
//!
//! # Architecture
//!
//! ```text
//! VoiceOrchestrator
//!        │
//!        ▼
//! PlaybackArbiter ── speak_native ──▶ dyn NativeVoice  (EspeakVoice)
//!        │        ── play_clip ─────▶ dyn BufferPlayer (CpalSink)
//!        │
//!        └── completion watcher (PlaybackDone) ──▶ back to Idle
//! ```
//!
//! Both mechanisms report natural completion over a [`PlaybackDone`]
//! channel; the arbiter watches it and transitions back to `Idle`, guarded
//! by a generation counter so a stale completion never clobbers a newer
//! playback.

pub mod arbiter;
pub mod device;
pub mod sink;

use std::sync::Arc;

use thiserror::Error;

use crate::synth::AudioClip;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors from the underlying playback primitives.
///
/// These never propagate past the arbiter boundary — stop failures are
/// swallowed and start failures degrade to a logged warning.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to start playback: {0}")]
    Start(String),

    #[error("failed to stop playback: {0}")]
    Stop(String),

    #[error("no audio output device available")]
    NoDevice,

    #[error("playback worker is not running")]
    WorkerGone,
}

// ---------------------------------------------------------------------------
// PlaybackDone
// ---------------------------------------------------------------------------

/// Completion notification for a single playback.
///
/// Receives one `()` when the audio finishes naturally; the sender is
/// dropped without sending when the playback is cancelled or fails.  Either
/// way the arbiter's watcher wakes up.
pub type PlaybackDone = std::sync::mpsc::Receiver<()>;

// ---------------------------------------------------------------------------
// NativeVoice / BufferPlayer traits
// ---------------------------------------------------------------------------

/// On-device speech synthesis primitive (fire-and-forget, own queue of one).
pub trait NativeVoice: Send + Sync {
    /// Start speaking `text` in the voice for `locale`, cancelling any
    /// utterance already in progress.
    ///
    /// `rate` is a speed multiplier (1.0 = normal) and `pitch` a pitch
    /// multiplier (1.0 = normal).
    fn speak(
        &self,
        text: &str,
        locale: &str,
        rate: f32,
        pitch: f32,
    ) -> Result<PlaybackDone, PlaybackError>;

    /// Silence the current utterance.  Must be a no-op when nothing is
    /// speaking.
    fn cancel(&self) -> Result<(), PlaybackError>;
}

/// Decoded-buffer playback primitive.
pub trait BufferPlayer: Send + Sync {
    /// Start playing `clip` from offset 0, replacing any clip already
    /// playing.
    fn play(&self, clip: Arc<AudioClip>) -> Result<PlaybackDone, PlaybackError>;

    /// Stop the current clip.  Must be a no-op when nothing is playing.
    fn stop(&self) -> Result<(), PlaybackError>;
}

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use arbiter::{PlaybackArbiter, PlaybackState, NATIVE_PITCH, NATIVE_RATE};
pub use device::EspeakVoice;
pub use sink::CpalSink;
