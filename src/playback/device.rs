//! Device speech synthesis via an `espeak-ng` subprocess.
//!
//! [`EspeakVoice`] spawns the system TTS binary per utterance and kills it
//! on cancel.  A watcher thread polls the child so natural completion is
//! reported over the [`PlaybackDone`] channel.
//!
//! espeak-ng must be installed (`apt-get install espeak-ng` on Debian-based
//! systems, `brew install espeak-ng` on macOS).

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::playback::{NativeVoice, PlaybackDone, PlaybackError};

/// espeak-ng's default speaking rate in words per minute; the `rate`
/// multiplier scales this.
const BASE_WPM: f32 = 175.0;

/// espeak-ng's neutral pitch value (range 0–99); the `pitch` multiplier
/// scales this.
const BASE_PITCH: f32 = 50.0;

/// Map a BCP-47 locale tag to an espeak-ng voice name.
fn espeak_voice(locale: &str) -> String {
    match locale {
        "mr-IN" => "mr".into(),
        "hi-IN" => "hi".into(),
        "en-US" => "en-us".into(),
        // Unknown tags: primary language subtag, lowercased.
        other => other
            .split('-')
            .next()
            .unwrap_or(other)
            .to_lowercase(),
    }
}

// ---------------------------------------------------------------------------
// EspeakVoice
// ---------------------------------------------------------------------------

/// [`NativeVoice`] backed by an espeak-ng subprocess.
///
/// At most one child process is alive at a time; `speak` kills any previous
/// one before spawning.  The slot tags the child with a per-utterance id so
/// a watcher from a superseded utterance can never act on a newer child.
pub struct EspeakVoice {
    command: String,
    child: Arc<Mutex<Option<(u64, Child)>>>,
    next_id: AtomicU64,
}

impl EspeakVoice {
    /// Voice using the default `espeak-ng` binary from `PATH`.
    pub fn new() -> Self {
        Self::with_command("espeak-ng")
    }

    /// Voice using an explicit binary name (e.g. `"espeak"` on systems that
    /// still ship the original).
    pub fn with_command(command: &str) -> Self {
        Self {
            command: command.to_string(),
            child: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }
}

impl Default for EspeakVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeVoice for EspeakVoice {
    fn speak(
        &self,
        text: &str,
        locale: &str,
        rate: f32,
        pitch: f32,
    ) -> Result<PlaybackDone, PlaybackError> {
        // Own queue of one: silence whatever is still speaking.
        self.cancel()?;

        let wpm = (BASE_WPM * rate).round() as u32;
        let pitch_value = (BASE_PITCH * pitch).round().clamp(0.0, 99.0) as u32;

        let child = Command::new(&self.command)
            .arg("-v")
            .arg(espeak_voice(locale))
            .arg("-s")
            .arg(wpm.to_string())
            .arg("-p")
            .arg(pitch_value.to_string())
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Start(format!("{}: {e}", self.command)))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        *self.child.lock().unwrap() = Some((id, child));

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let slot = Arc::clone(&self.child);

        std::thread::Builder::new()
            .name("espeak-watch".into())
            .spawn(move || {
                loop {
                    {
                        let mut guard = slot.lock().unwrap();
                        match guard.as_mut() {
                            Some((slot_id, child)) if *slot_id == id => {
                                match child.try_wait() {
                                    Ok(Some(_status)) => {
                                        *guard = None;
                                        break;
                                    }
                                    Ok(None) => {}
                                    Err(e) => {
                                        log::debug!("espeak wait failed: {e}");
                                        *guard = None;
                                        break;
                                    }
                                }
                            }
                            // A newer speak/cancel replaced or took the
                            // child; this watcher is stale.
                            _ => return,
                        }
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                let _ = done_tx.send(());
            })
            .map_err(|e| PlaybackError::Start(format!("watcher thread: {e}")))?;

        Ok(done_rx)
    }

    fn cancel(&self) -> Result<(), PlaybackError> {
        if let Some((_, mut child)) = self.child.lock().unwrap().take() {
            // Kill errors mean the process already exited — nothing to do.
            if let Err(e) = child.kill() {
                log::debug!("espeak kill: {e}");
            }
            let _ = child.wait();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_locales() {
        assert_eq!(espeak_voice("mr-IN"), "mr");
        assert_eq!(espeak_voice("hi-IN"), "hi");
        assert_eq!(espeak_voice("en-US"), "en-us");
    }

    #[test]
    fn unknown_locale_uses_primary_subtag() {
        assert_eq!(espeak_voice("ta-IN"), "ta");
        assert_eq!(espeak_voice("fr"), "fr");
    }

    #[test]
    fn cancel_is_a_noop_when_idle() {
        let voice = EspeakVoice::new();
        assert!(voice.cancel().is_ok());
        assert!(voice.cancel().is_ok());
    }

    #[test]
    fn speak_with_missing_binary_reports_start_error() {
        let voice = EspeakVoice::with_command("definitely-not-a-tts-binary");
        let result = voice.speak("hello", "en-US", 0.9, 1.0);
        assert!(matches!(result, Err(PlaybackError::Start(_))));
    }

    /// Two overlapping utterances: the superseded watcher must not claim
    /// the newer child's exit, so natural completion arrives on the live
    /// utterance's channel and the stale channel just closes.
    #[cfg(unix)]
    #[test]
    fn completion_goes_to_the_live_utterance() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-tts");
        std::fs::write(&script, "#!/bin/sh\nsleep 0.3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let voice = EspeakVoice::with_command(script.to_str().unwrap());
        let first = voice.speak("one", "en-US", 0.9, 1.0).unwrap();
        let second = voice.speak("two", "en-US", 0.9, 1.0).unwrap();

        assert!(second.recv_timeout(Duration::from_secs(2)).is_ok());
        assert!(first.recv_timeout(Duration::from_secs(2)).is_err());
    }

    #[test]
    fn voice_is_object_safe() {
        let voice: Box<dyn NativeVoice> = Box::new(EspeakVoice::new());
        drop(voice);
    }
}
