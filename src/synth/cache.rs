//! Session-scoped memo of synthesised speech.
//!
//! Identical `(language, voice, text)` requests within one session replay
//! the decoded clip instead of re-hitting the network.  Entries are never
//! evicted; unbounded growth is an accepted tradeoff for a session-scoped
//! client cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::lang::Language;
use crate::synth::decode::AudioClip;

// ---------------------------------------------------------------------------
// CacheKey
// ---------------------------------------------------------------------------

/// Composite cache key.  Text is trimmed but otherwise matched exactly —
/// no fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    language: Language,
    voice: String,
    text: String,
}

impl CacheKey {
    fn new(language: Language, voice: &str, text: &str) -> Self {
        Self {
            language,
            voice: voice.to_string(),
            text: text.trim().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioResponseCache
// ---------------------------------------------------------------------------

/// Mapping from `(language, voice identity, trimmed text)` to a decoded
/// clip.  Clips are shared as `Arc` so a cache hit is a pointer clone.
pub struct AudioResponseCache {
    entries: Mutex<HashMap<CacheKey, Arc<AudioClip>>>,
}

impl AudioResponseCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a previously synthesised clip.
    pub fn get(&self, language: Language, voice: &str, text: &str) -> Option<Arc<AudioClip>> {
        let key = CacheKey::new(language, voice, text);
        self.entries.lock().unwrap().get(&key).cloned()
    }

    /// Store a decoded clip.  A later `put` for the same key replaces the
    /// earlier entry.
    pub fn put(&self, language: Language, voice: &str, text: &str, clip: Arc<AudioClip>) {
        let key = CacheKey::new(language, voice, text);
        self.entries.lock().unwrap().insert(key, clip);
    }

    /// Number of cached clips (used by the demo binary's `/quota` status).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AudioResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
