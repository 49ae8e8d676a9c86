//! Client-side quota circuit breaker.
//!
//! After an upstream rate-limit failure the breaker stays open for a fixed
//! cooldown window and short-circuits every guarded call started inside it.
//! There is no half-open probing: on a mobile client the cooldown simply
//! expires and the next call goes through.  The recorded failure is cleared
//! lazily on the next check, so no background timer is needed.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::quota::classify::is_rate_limit;

/// How long the breaker stays open after a detected quota failure.
pub const QUOTA_COOLDOWN: Duration = Duration::from_millis(60_000);

// ---------------------------------------------------------------------------
// GuardError
// ---------------------------------------------------------------------------

/// Failures surfaced by [`QuotaBreaker::guard`].
#[derive(Debug, Error)]
pub enum GuardError {
    /// The breaker is open; the wrapped operation was never attempted.
    /// Callers should wait out the remaining cooldown before retrying.
    #[error("quota cooldown active ({}s remaining)", .0.as_secs())]
    QuotaActive(Duration),

    /// The call just failed due to upstream rate limiting; the breaker is
    /// now open.
    #[error("upstream quota exhausted")]
    QuotaExceeded,

    /// Any other failure from the wrapped operation, passed through.
    #[error("upstream call failed: {0}")]
    Upstream(String),
}

// ---------------------------------------------------------------------------
// QuotaBreaker
// ---------------------------------------------------------------------------

/// Shared circuit-breaker state wrapping every outbound AI call.
///
/// Concurrent calls all see the same state: the first failure records the
/// timestamp, calls already in flight complete or fail on their own, and
/// any call *started* after the timestamp is short-circuited.
///
/// # Example
/// ```rust,no_run
/// use agrovoice::quota::QuotaBreaker;
///
/// # async fn demo() {
/// let breaker = QuotaBreaker::new();
/// let result = breaker
///     .guard(|| async { Err::<(), _>("HTTP 429 Too Many Requests") })
///     .await;
/// assert!(result.is_err());
/// assert!(breaker.is_limited());
/// # }
/// ```
pub struct QuotaBreaker {
    cooldown: Duration,
    last_failure: Mutex<Option<Instant>>,
}

impl QuotaBreaker {
    /// Breaker with the production cooldown of [`QUOTA_COOLDOWN`].
    pub fn new() -> Self {
        Self::with_cooldown(QUOTA_COOLDOWN)
    }

    /// Breaker with an explicit cooldown window (tests use short windows).
    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_failure: Mutex::new(None),
        }
    }

    /// `true` while a failure recorded within the cooldown window is active.
    ///
    /// Once the window has elapsed the recorded failure is cleared as a side
    /// effect (lazy reset).
    pub fn is_limited(&self) -> bool {
        let mut last = self.last_failure.lock().unwrap();
        match *last {
            None => false,
            Some(at) if at.elapsed() >= self.cooldown => {
                *last = None;
                false
            }
            Some(_) => true,
        }
    }

    /// Time left in the active cooldown, or zero when not limited.
    pub fn remaining_cooldown(&self) -> Duration {
        let last = self.last_failure.lock().unwrap();
        match *last {
            None => Duration::ZERO,
            Some(at) => self.cooldown.saturating_sub(at.elapsed()),
        }
    }

    /// Record a quota failure observed just now, opening the breaker.
    fn record_failure(&self) {
        *self.last_failure.lock().unwrap() = Some(Instant::now());
    }

    /// Run `op` unless the breaker is open.
    ///
    /// * Open circuit: returns [`GuardError::QuotaActive`] immediately; `op`
    ///   is never invoked.
    /// * `op` fails with a rate-limit error (see
    ///   [`crate::quota::classify::is_rate_limit`]): records the failure and
    ///   returns [`GuardError::QuotaExceeded`].
    /// * Any other failure: passed through as [`GuardError::Upstream`].
    pub async fn guard<T, E, F, Fut>(&self, op: F) -> Result<T, GuardError>
    where
        E: std::fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.is_limited() {
            return Err(GuardError::QuotaActive(self.remaining_cooldown()));
        }

        match op().await {
            Ok(value) => Ok(value),
            Err(e) => {
                let message = e.to_string();
                if is_rate_limit(&message) {
                    log::warn!("upstream quota exhausted; opening breaker: {message}");
                    self.record_failure();
                    Err(GuardError::QuotaExceeded)
                } else {
                    Err(GuardError::Upstream(message))
                }
            }
        }
    }
}

impl Default for QuotaBreaker {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
