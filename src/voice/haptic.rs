//! Best-effort haptic feedback.
//!
//! UI call sites pulse the motor alongside voice on user actions.  The
//! trait is fire-and-forget: platforms without a vibration motor install
//! [`NoopHaptics`] and every pulse is silently ignored — absence is not an
//! error.

/// Millisecond on/off pattern for a light tap on button presses.
pub const TAP: &[u64] = &[15];

/// Slightly stronger pulse used on navigation.
pub const NAVIGATE: &[u64] = &[25];

/// Haptic primitive.  Implementations must never block or fail loudly.
pub trait Haptics: Send + Sync {
    /// Vibrate with alternating on/off durations in milliseconds.
    fn vibrate(&self, pattern: &[u64]);
}

/// Haptics for platforms without a motor — every pulse is a no-op.
pub struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn vibrate(&self, _pattern: &[u64]) {}
}
