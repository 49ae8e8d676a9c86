//! Quota circuit breaker for outbound AI calls.
//!
//! The upstream generative service throttles aggressively; once one call
//! fails with a rate-limit error there is no point in sending more for a
//! while.  [`QuotaBreaker`] records the failure and short-circuits every
//! guarded call for a fixed cooldown window.  The UI polls
//! [`QuotaBreaker::is_limited`] / [`QuotaBreaker::remaining_cooldown`] to
//! render a countdown and disable quota-sensitive actions.

pub mod breaker;
pub mod classify;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use breaker::{GuardError, QuotaBreaker, QUOTA_COOLDOWN};
pub use classify::is_rate_limit;
