//! Decoded-buffer playback via a `cpal` output stream.
//!
//! `cpal::Stream` is not `Send` on every platform, so [`CpalSink`] spawns a
//! dedicated `audio-playback` thread that owns the stream and drives it
//! from a command channel.  The public handle is `Send + Sync` and cheap to
//! share behind `Arc<dyn BufferPlayer>`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::playback::{BufferPlayer, PlaybackDone, PlaybackError};
use crate::synth::AudioClip;

// ---------------------------------------------------------------------------
// Worker commands
// ---------------------------------------------------------------------------

enum SinkCommand {
    /// Start playing `clip` from offset 0; send `()` on the first channel
    /// when the last sample has been written to the device, and the start
    /// outcome on the second so `play` can report failures synchronously.
    Play(Arc<AudioClip>, Sender<()>, Sender<Result<(), PlaybackError>>),
    /// Drop the current stream, if any.
    Stop,
}

// ---------------------------------------------------------------------------
// CpalSink
// ---------------------------------------------------------------------------

/// [`BufferPlayer`] backed by the system default output device.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use agrovoice::playback::{BufferPlayer, CpalSink};
/// use agrovoice::synth::{AudioClip, TTS_SAMPLE_RATE};
///
/// let sink = CpalSink::spawn();
/// let clip = Arc::new(AudioClip {
///     samples: vec![0.0; 24_000],
///     sample_rate: TTS_SAMPLE_RATE,
/// });
/// let done = sink.play(clip).unwrap();
/// let _ = done.recv(); // blocks until the clip finishes
/// ```
pub struct CpalSink {
    command_tx: Sender<SinkCommand>,
}

impl CpalSink {
    /// Spawn the playback worker thread and return the handle.
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = mpsc::channel::<SinkCommand>();

        std::thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || {
                // (stream, finished flag) for the clip currently playing.
                let mut current: Option<(cpal::Stream, Arc<AtomicBool>)> = None;

                loop {
                    match command_rx.recv_timeout(Duration::from_millis(100)) {
                        Ok(SinkCommand::Play(clip, done_tx, reply_tx)) => {
                            current = None; // drop any previous stream first
                            match start_stream(clip, done_tx) {
                                Ok(started) => {
                                    current = Some(started);
                                    let _ = reply_tx.send(Ok(()));
                                }
                                Err(e) => {
                                    log::warn!("buffer playback failed: {e}");
                                    let _ = reply_tx.send(Err(e));
                                }
                            }
                        }
                        Ok(SinkCommand::Stop) => {
                            current = None;
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            // Release the device once the clip has drained.
                            if let Some((_, finished)) = &current {
                                if finished.load(Ordering::Relaxed) {
                                    current = None;
                                }
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .expect("failed to spawn audio-playback thread");

        Self { command_tx }
    }
}

/// Build and start an output stream for `clip` on the worker thread.
fn start_stream(
    clip: Arc<AudioClip>,
    done_tx: Sender<()>,
) -> Result<(cpal::Stream, Arc<AtomicBool>), PlaybackError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PlaybackError::NoDevice)?;

    let supported = device
        .default_output_config()
        .map_err(|e| PlaybackError::Start(e.to_string()))?;
    let channels = supported.channels() as usize;

    let config = cpal::StreamConfig {
        channels: channels as u16,
        sample_rate: cpal::SampleRate(clip.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let position = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));
    let finished_cb = Arc::clone(&finished);

    // The callback sends the completion exactly once, then only writes
    // silence.
    let mut done_tx = Some(done_tx);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut pos = position.load(Ordering::Relaxed);
                for frame in data.chunks_mut(channels) {
                    let sample = clip.samples.get(pos).copied().unwrap_or(0.0);
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                    if pos < clip.samples.len() {
                        pos += 1;
                    }
                }
                position.store(pos, Ordering::Relaxed);

                if pos >= clip.samples.len() {
                    finished_cb.store(true, Ordering::Relaxed);
                    if let Some(tx) = done_tx.take() {
                        // Ignore send errors; the watcher may be gone.
                        let _ = tx.send(());
                    }
                }
            },
            |err: cpal::StreamError| {
                log::error!("cpal output stream error: {err}");
            },
            None,
        )
        .map_err(|e| PlaybackError::Start(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::Start(e.to_string()))?;

    Ok((stream, finished))
}

impl BufferPlayer for CpalSink {
    fn play(&self, clip: Arc<AudioClip>) -> Result<PlaybackDone, PlaybackError> {
        let (done_tx, done_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        self.command_tx
            .send(SinkCommand::Play(clip, done_tx, reply_tx))
            .map_err(|_| PlaybackError::WorkerGone)?;
        // The worker replies as soon as the stream is built (or refused).
        reply_rx
            .recv()
            .map_err(|_| PlaybackError::WorkerGone)??;
        Ok(done_rx)
    }

    fn stop(&self) -> Result<(), PlaybackError> {
        self.command_tx
            .send(SinkCommand::Stop)
            .map_err(|_| PlaybackError::WorkerGone)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
