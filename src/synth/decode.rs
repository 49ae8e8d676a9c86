//! Decoding of network speech audio into a playable clip.
//!
//! The synthesis endpoint returns base64-encoded raw PCM: 16-bit
//! little-endian signed samples, mono, 24 kHz.  [`decode_pcm16`] turns that
//! into normalised `f32` samples in `[-1.0, 1.0]` ready for the output
//! device.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

/// Sample rate of all AI-synthesised speech, in Hz.
pub const TTS_SAMPLE_RATE: u32 = 24_000;

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// A decoded, ready-to-play audio buffer.
///
/// Samples are mono `f32` in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Normalised PCM samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// Errors produced while decoding an encoded audio payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// 16-bit PCM requires an even byte count.
    #[error("PCM payload has an odd byte count ({0})")]
    OddByteCount(usize),

    #[error("audio payload is empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// decode_pcm16
// ---------------------------------------------------------------------------

/// Decode a base64 payload of 16-bit little-endian PCM into an [`AudioClip`]
/// at [`TTS_SAMPLE_RATE`].
pub fn decode_pcm16(encoded: &str) -> Result<AudioClip, DecodeError> {
    let bytes = BASE64.decode(encoded)?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddByteCount(bytes.len()));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| {
            let value = i16::from_le_bytes([pair[0], pair[1]]);
            value as f32 / 32_768.0
        })
        .collect();

    Ok(AudioClip {
        samples,
        sample_rate: TTS_SAMPLE_RATE,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
