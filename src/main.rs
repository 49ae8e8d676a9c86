//! Application entry point — AgroVoice demo REPL.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Wire the voice stack: espeak-ng device voice, cpal buffer sink,
//!    playback arbiter, quota breaker, audio cache, HTTP synthesizer,
//!    orchestrator.
//! 5. Spawn an alert watcher that mirrors the transient overlay to stdout.
//! 6. Read commands from stdin until EOF or `/quit`.
//!
//! # Commands
//!
//! | Input | Effect |
//! |-------|--------|
//! | any text | speak it via the configured backend |
//! | `/mute` | toggle mute (persists; stops all voice when muting) |
//! | `/stop` | immediate silence + alert clear |
//! | `/lang <name>` | switch language (Marathi / Hindi / English) |
//! | `/backend <system\|ai>` | switch speech backend (persists) |
//! | `/quota` | print breaker state and cache size |
//! | `/sample` | print the offline sample diagnosis |
//! | `/quit` | exit |

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use agrovoice::advisor::sample_report;
use agrovoice::config::AppConfig;
use agrovoice::lang::Language;
use agrovoice::playback::{BufferPlayer, CpalSink, EspeakVoice, NativeVoice, PlaybackArbiter};
use agrovoice::quota::QuotaBreaker;
use agrovoice::synth::{AudioResponseCache, HttpSynthesizer, SpeechSynthesizer};
use agrovoice::voice::{haptic, Haptics, NoopHaptics, VoiceBackend, VoiceOrchestrator};

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("AgroVoice starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    rt.block_on(run(config))
}

async fn run(mut config: AppConfig) -> Result<()> {
    // 4. Voice stack
    let breaker = Arc::new(QuotaBreaker::new());
    let cache = Arc::new(AudioResponseCache::new());
    let arbiter = Arc::new(PlaybackArbiter::new(
        Arc::new(EspeakVoice::with_command(&config.voice.native_command)) as Arc<dyn NativeVoice>,
        Arc::new(CpalSink::spawn()) as Arc<dyn BufferPlayer>,
    ));
    let synth: Arc<dyn SpeechSynthesizer> =
        Arc::new(HttpSynthesizer::from_config(&config.synth));
    let orchestrator = Arc::new(VoiceOrchestrator::new(
        Arc::clone(&breaker),
        Arc::clone(&cache),
        arbiter,
        synth,
    ));
    let haptics: Arc<dyn Haptics> = Arc::new(NoopHaptics);

    // 5. Mirror the transient alert overlay to stdout
    let mut alerts = orchestrator.alerts();
    tokio::spawn(async move {
        while alerts.changed().await.is_ok() {
            match alerts.borrow().as_deref() {
                Some(text) => println!("  [alert] {text}"),
                None => println!("  [alert cleared]"),
            }
        }
    });

    println!(
        "AgroVoice demo — language: {}, backend: {:?}, muted: {}",
        config.voice.language.label(),
        config.voice.backend,
        config.voice.muted
    );
    println!("Type text to speak it, or /mute /stop /lang /backend /quota /sample /quit");

    // 6. Command loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(a, b)| (a, b)) {
            ("/quit", _) => break,

            ("/stop", _) => {
                orchestrator.stop_all();
                println!("stopped");
            }

            ("/mute", _) => {
                config.voice.muted = !config.voice.muted;
                if config.voice.muted {
                    // Muting silences whatever is already speaking.
                    orchestrator.stop_all();
                }
                if let Err(e) = config.save() {
                    log::warn!("could not persist settings: {e}");
                }
                println!("muted: {}", config.voice.muted);
            }

            ("/lang", name) => match Language::parse(name) {
                Some(language) => {
                    config.voice.language = language;
                    if let Err(e) = config.save() {
                        log::warn!("could not persist settings: {e}");
                    }
                    println!("language: {}", language.label());
                }
                None => println!("unknown language: {name}"),
            },

            ("/backend", which) => {
                let backend = match which.trim().to_lowercase().as_str() {
                    "system" => Some(VoiceBackend::System),
                    "ai" => Some(VoiceBackend::Ai),
                    _ => None,
                };
                match backend {
                    Some(backend) => {
                        config.voice.backend = backend;
                        if let Err(e) = config.save() {
                            log::warn!("could not persist settings: {e}");
                        }
                        println!("backend: {backend:?}");
                    }
                    None => println!("backend must be 'system' or 'ai'"),
                }
            }

            ("/quota", _) => {
                println!(
                    "limited: {}, cooldown remaining: {} ms, cached clips: {}",
                    orchestrator.is_quota_limited(),
                    orchestrator.remaining_cooldown_ms(),
                    cache.len()
                );
            }

            ("/sample", _) => {
                let report = sample_report(config.voice.language);
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            _ => {
                haptics.vibrate(haptic::TAP);
                orchestrator.speak(
                    line,
                    config.voice.backend,
                    config.voice.language,
                    config.voice.gender,
                    config.voice.muted,
                );
            }
        }
    }

    orchestrator.stop_all();
    log::info!("AgroVoice shutting down");
    Ok(())
}
