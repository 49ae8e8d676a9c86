//! Voice façade — the one entry point for "say this out loud".
//!
//! ```text
//! UI event ──▶ VoiceOrchestrator::speak(text, backend, …)
//!                  │
//!                  ├── AlertFeed (always, 5 s auto-clear)
//!                  ├── muted? ── yes ──▶ done (alert only)
//!                  ├── System ─────────▶ PlaybackArbiter::speak_native
//!                  └── Ai ── breaker ── cache ── guarded synth ── decode
//!                                │ any failure
//!                                └─────▶ PlaybackArbiter::speak_native
//! ```

pub mod alert;
pub mod haptic;
pub mod orchestrator;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use alert::{AlertFeed, ALERT_HOLD};
pub use haptic::{Haptics, NoopHaptics};
pub use orchestrator::{VoiceBackend, VoiceOrchestrator};
