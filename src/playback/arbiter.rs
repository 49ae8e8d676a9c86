//! Single-active-output arbiter.
//!
//! [`PlaybackArbiter`] owns the only playback slot in the process.  Every
//! start goes through the same sequence under one lock: silence **both**
//! mechanisms (stopping an inactive one is a harmless no-op), bump the
//! playback generation, then start the new output.  Two rapid `speak`
//! calls therefore never overlap — the first voice is fully silenced
//! before the second begins.
//!
//! # State machine
//!
//! ```text
//! Idle ──speak_native──▶ PlayingNative
//!      ──play_clip────▶ PlayingBuffer
//! PlayingNative / PlayingBuffer
//!      ──stop / natural completion──▶ Idle
//! ```
//!
//! Natural completion arrives over the mechanism's [`PlaybackDone`]
//! channel; a watcher thread folds it back into `Idle` only when the
//! completion's generation still matches, so a completion from a playback
//! that has already been replaced is ignored.

use std::sync::{Arc, Mutex};

use crate::lang::Language;
use crate::playback::{BufferPlayer, NativeVoice, PlaybackDone, PlaybackError};
use crate::synth::AudioClip;

/// Device speech rate multiplier (slightly slower than normal for clarity).
pub const NATIVE_RATE: f32 = 0.9;

/// Device speech pitch multiplier.
pub const NATIVE_PITCH: f32 = 1.0;

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// Which playback mechanism currently holds the output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing is audible.
    Idle,
    /// The device speech synthesizer is speaking.
    PlayingNative,
    /// A decoded AI clip is playing.
    PlayingBuffer,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Idle
    }
}

struct ArbiterInner {
    state: PlaybackState,
    /// Incremented on every start and every explicit stop; completions
    /// carry the generation they were started under.
    generation: u64,
}

// ---------------------------------------------------------------------------
// PlaybackArbiter
// ---------------------------------------------------------------------------

/// Enforces the at-most-one-active-audio invariant across the two
/// heterogeneous playback mechanisms.
pub struct PlaybackArbiter {
    native: Arc<dyn NativeVoice>,
    player: Arc<dyn BufferPlayer>,
    inner: Arc<Mutex<ArbiterInner>>,
}

impl PlaybackArbiter {
    pub fn new(native: Arc<dyn NativeVoice>, player: Arc<dyn BufferPlayer>) -> Self {
        Self {
            native,
            player,
            inner: Arc::new(Mutex::new(ArbiterInner {
                state: PlaybackState::Idle,
                generation: 0,
            })),
        }
    }

    /// Current slot owner.
    pub fn state(&self) -> PlaybackState {
        self.inner.lock().unwrap().state
    }

    /// Speak `text` through the device synthesizer, silencing any current
    /// output first.
    pub fn speak_native(&self, text: &str, language: Language) {
        let mut inner = self.inner.lock().unwrap();
        self.silence();
        inner.generation += 1;
        let generation = inner.generation;

        match self
            .native
            .speak(text, language.locale_tag(), NATIVE_RATE, NATIVE_PITCH)
        {
            Ok(done) => {
                inner.state = PlaybackState::PlayingNative;
                self.watch_completion(generation, done);
            }
            Err(e) => {
                log::warn!("device speech failed to start: {e}");
                inner.state = PlaybackState::Idle;
            }
        }
    }

    /// Play a decoded clip, silencing any current output first.
    ///
    /// Returns `false` when the buffer mechanism refused to start (no
    /// output device, unsupported stream config); the slot is left `Idle`
    /// and the caller decides on a fallback.
    pub fn play_clip(&self, clip: Arc<AudioClip>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        self.silence();
        inner.generation += 1;
        let generation = inner.generation;

        match self.player.play(clip) {
            Ok(done) => {
                inner.state = PlaybackState::PlayingBuffer;
                self.watch_completion(generation, done);
                true
            }
            Err(e) => {
                log::warn!("buffer playback failed to start: {e}");
                inner.state = PlaybackState::Idle;
                false
            }
        }
    }

    /// Explicit stop — safe from any state, including `Idle`.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        self.silence();
        inner.generation += 1;
        inner.state = PlaybackState::Idle;
    }

    /// Silence both mechanisms unconditionally, swallowing stop errors.
    fn silence(&self) {
        if let Err(e) = self.native.cancel() {
            log::debug!("native cancel: {e}");
        }
        if let Err(e) = self.player.stop() {
            log::debug!("buffer stop: {e}");
        }
    }

    /// Fold a natural completion back into `Idle`, unless a newer playback
    /// (or stop) has taken the slot since.
    fn watch_completion(&self, generation: u64, done: PlaybackDone) {
        let inner = Arc::clone(&self.inner);
        let spawned = std::thread::Builder::new()
            .name("playback-watch".into())
            .spawn(move || {
                // Ok(()) = finished naturally; Err = cancelled or failed.
                // Either way the slot is free if nothing newer claimed it.
                let _ = done.recv();
                let mut inner = inner.lock().unwrap();
                if inner.generation == generation {
                    inner.state = PlaybackState::Idle;
                }
            });
        if let Err(e) = spawned {
            log::warn!("failed to spawn completion watcher: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Sender;
    use std::time::{Duration, Instant};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Shared call log, so tests can assert cross-mechanism ordering.
    type CallLog = Arc<Mutex<Vec<String>>>;

    /// NativeVoice double that records calls and hands out controllable
    /// completion channels.
    struct FakeVoice {
        log: CallLog,
        done_senders: Mutex<Vec<Sender<()>>>,
        fail_start: bool,
    }

    impl FakeVoice {
        fn new(log: CallLog) -> Self {
            Self {
                log,
                done_senders: Mutex::new(Vec::new()),
                fail_start: false,
            }
        }
    }

    impl NativeVoice for FakeVoice {
        fn speak(
            &self,
            text: &str,
            locale: &str,
            _rate: f32,
            _pitch: f32,
        ) -> Result<PlaybackDone, PlaybackError> {
            if self.fail_start {
                return Err(PlaybackError::Start("no device voice".into()));
            }
            self.log
                .lock()
                .unwrap()
                .push(format!("native-speak:{text}:{locale}"));
            let (tx, rx) = std::sync::mpsc::channel();
            self.done_senders.lock().unwrap().push(tx);
            Ok(rx)
        }

        fn cancel(&self) -> Result<(), PlaybackError> {
            self.log.lock().unwrap().push("native-cancel".into());
            Ok(())
        }
    }

    /// BufferPlayer double with the same recording scheme.
    struct FakePlayer {
        log: CallLog,
        done_senders: Mutex<Vec<Sender<()>>>,
        fail_start: bool,
    }

    impl FakePlayer {
        fn new(log: CallLog) -> Self {
            Self {
                log,
                done_senders: Mutex::new(Vec::new()),
                fail_start: false,
            }
        }
    }

    impl BufferPlayer for FakePlayer {
        fn play(&self, clip: Arc<AudioClip>) -> Result<PlaybackDone, PlaybackError> {
            if self.fail_start {
                return Err(PlaybackError::NoDevice);
            }
            self.log
                .lock()
                .unwrap()
                .push(format!("buffer-play:{}", clip.samples.len()));
            let (tx, rx) = std::sync::mpsc::channel();
            self.done_senders.lock().unwrap().push(tx);
            Ok(rx)
        }

        fn stop(&self) -> Result<(), PlaybackError> {
            self.log.lock().unwrap().push("buffer-stop".into());
            Ok(())
        }
    }

    fn clip(n: usize) -> Arc<AudioClip> {
        Arc::new(AudioClip {
            samples: vec![0.1; n],
            sample_rate: 24_000,
        })
    }

    fn make_arbiter() -> (PlaybackArbiter, Arc<FakeVoice>, Arc<FakePlayer>, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let voice = Arc::new(FakeVoice::new(Arc::clone(&log)));
        let player = Arc::new(FakePlayer::new(Arc::clone(&log)));
        let arbiter = PlaybackArbiter::new(
            Arc::clone(&voice) as Arc<dyn NativeVoice>,
            Arc::clone(&player) as Arc<dyn BufferPlayer>,
        );
        (arbiter, voice, player, log)
    }

    /// Poll until the arbiter reaches `want` or the deadline passes.
    fn wait_for_state(arbiter: &PlaybackArbiter, want: PlaybackState) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if arbiter.state() == want {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    fn starts_idle() {
        let (arbiter, _, _, _) = make_arbiter();
        assert_eq!(arbiter.state(), PlaybackState::Idle);
    }

    #[test]
    fn speak_native_enters_playing_native() {
        let (arbiter, _, _, _) = make_arbiter();
        arbiter.speak_native("hello", Language::English);
        assert_eq!(arbiter.state(), PlaybackState::PlayingNative);
    }

    #[test]
    fn play_clip_enters_playing_buffer() {
        let (arbiter, _, _, _) = make_arbiter();
        arbiter.play_clip(clip(100));
        assert_eq!(arbiter.state(), PlaybackState::PlayingBuffer);
    }

    #[test]
    fn stop_is_safe_from_idle() {
        let (arbiter, _, _, _) = make_arbiter();
        arbiter.stop();
        arbiter.stop();
        assert_eq!(arbiter.state(), PlaybackState::Idle);
    }

    /// Both mechanisms are silenced before any start, unconditionally.
    #[test]
    fn start_silences_both_mechanisms_first() {
        let (arbiter, _, _, log) = make_arbiter();
        arbiter.speak_native("hi", Language::Hindi);

        let calls = log.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec!["native-cancel", "buffer-stop", "native-speak:hi:hi-IN"]
        );
    }

    /// Invoking play_clip while the native voice is speaking must cancel it
    /// before the buffer starts.
    #[test]
    fn stop_before_start_across_mechanisms() {
        let (arbiter, _, _, log) = make_arbiter();
        arbiter.speak_native("first", Language::English);
        arbiter.play_clip(clip(10));

        let calls = log.lock().unwrap().clone();
        let cancel_pos = calls
            .iter()
            .rposition(|c| c == "native-cancel")
            .expect("native cancel recorded");
        let play_pos = calls
            .iter()
            .position(|c| c.starts_with("buffer-play"))
            .expect("buffer play recorded");
        assert!(cancel_pos < play_pos, "cancel must precede start: {calls:?}");
        assert_eq!(arbiter.state(), PlaybackState::PlayingBuffer);
    }

    /// Two rapid native speaks: one cancel between them, final text wins.
    #[test]
    fn rapid_native_speaks_serialize() {
        let (arbiter, _, _, log) = make_arbiter();
        arbiter.speak_native("A", Language::English);
        arbiter.speak_native("B", Language::English);

        let calls = log.lock().unwrap().clone();
        let speaks: Vec<String> = calls
            .iter()
            .filter(|c| c.starts_with("native-speak"))
            .cloned()
            .collect();
        assert_eq!(speaks, ["native-speak:A:en-US", "native-speak:B:en-US"]);
        // The second speak's silence sequence sits between the two starts.
        let first_speak = calls.iter().position(|c| c == "native-speak:A:en-US").unwrap();
        let cancel_after = calls[first_speak..]
            .iter()
            .position(|c| c == "native-cancel");
        assert!(cancel_after.is_some());
        assert_eq!(arbiter.state(), PlaybackState::PlayingNative);
    }

    #[test]
    fn natural_completion_returns_to_idle() {
        let (arbiter, _, player, _) = make_arbiter();
        arbiter.play_clip(clip(10));
        assert_eq!(arbiter.state(), PlaybackState::PlayingBuffer);

        let tx = player.done_senders.lock().unwrap().remove(0);
        tx.send(()).unwrap();
        assert!(wait_for_state(&arbiter, PlaybackState::Idle));
    }

    /// A completion from a superseded playback must not clobber the newer
    /// playback's state.
    #[test]
    fn stale_completion_is_ignored() {
        let (arbiter, _, player, _) = make_arbiter();
        arbiter.play_clip(clip(10)); // playback 1
        arbiter.play_clip(clip(20)); // playback 2 replaces it

        let stale_tx = player.done_senders.lock().unwrap().remove(0);
        stale_tx.send(()).unwrap();

        // Give the watcher time to (wrongly) act.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(arbiter.state(), PlaybackState::PlayingBuffer);

        // The live playback's completion still works.
        let live_tx = player.done_senders.lock().unwrap().remove(0);
        live_tx.send(()).unwrap();
        assert!(wait_for_state(&arbiter, PlaybackState::Idle));
    }

    /// Explicit stop drops the completion sender; the watcher must not
    /// resurrect state afterwards.
    #[test]
    fn stop_then_new_playback_survives_dropped_sender() {
        let (arbiter, voice, _, _) = make_arbiter();
        arbiter.speak_native("gone", Language::Marathi);
        arbiter.stop();
        assert_eq!(arbiter.state(), PlaybackState::Idle);

        arbiter.speak_native("kept", Language::Marathi);
        // Drop the first playback's sender: its watcher wakes with Err.
        voice.done_senders.lock().unwrap().remove(0);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(arbiter.state(), PlaybackState::PlayingNative);
    }

    /// `play_clip` reports whether the buffer actually started so callers
    /// can fall back instead of ending in silence.
    #[test]
    fn play_clip_reports_start_failure() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let voice = Arc::new(FakeVoice::new(Arc::clone(&log)));
        let mut player = FakePlayer::new(Arc::clone(&log));
        player.fail_start = true;
        let arbiter = PlaybackArbiter::new(
            voice as Arc<dyn NativeVoice>,
            Arc::new(player) as Arc<dyn BufferPlayer>,
        );

        assert!(!arbiter.play_clip(clip(10)));
        assert_eq!(arbiter.state(), PlaybackState::Idle);
    }

    #[test]
    fn play_clip_reports_successful_start() {
        let (arbiter, _, _, _) = make_arbiter();
        assert!(arbiter.play_clip(clip(10)));
    }

    /// A start failure is swallowed and leaves the slot idle.
    #[test]
    fn start_failure_degrades_to_idle() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let mut voice = FakeVoice::new(Arc::clone(&log));
        voice.fail_start = true;
        let player = Arc::new(FakePlayer::new(Arc::clone(&log)));
        let arbiter = PlaybackArbiter::new(
            Arc::new(voice) as Arc<dyn NativeVoice>,
            player as Arc<dyn BufferPlayer>,
        );

        arbiter.speak_native("nope", Language::English);
        assert_eq!(arbiter.state(), PlaybackState::Idle);
    }
}
