//! Transient on-screen alert feed.
//!
//! Every `speak` publishes its text here so the UI can render a top-of-screen
//! overlay even when audio is muted.  The text auto-clears after a fixed
//! hold; a newer announcement cancels the pending clear and restarts the
//! window from its own call time.  Navigation clears immediately.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long an announcement stays on screen without a successor.
pub const ALERT_HOLD: Duration = Duration::from_millis(5_000);

// ---------------------------------------------------------------------------
// AlertFeed
// ---------------------------------------------------------------------------

/// Watch-channel backed alert state: `Some(text)` while an alert is showing,
/// `None` after clear.
///
/// Must be used inside a Tokio runtime (the auto-clear is a spawned task).
pub struct AlertFeed {
    tx: Arc<watch::Sender<Option<String>>>,
    clear_task: Mutex<Option<JoinHandle<()>>>,
    hold: Duration,
}

impl AlertFeed {
    /// Feed with the production hold of [`ALERT_HOLD`].
    pub fn new() -> Self {
        Self::with_hold(ALERT_HOLD)
    }

    /// Feed with an explicit hold window (tests use short windows).
    pub fn with_hold(hold: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            clear_task: Mutex::new(None),
            hold,
        }
    }

    /// Receiver for the UI overlay to watch.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    /// Text currently showing, if any.
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Show `text` and (re)start the auto-clear timer, cancelling any
    /// pending clear from an earlier announcement.
    pub fn announce(&self, text: &str) {
        self.cancel_pending_clear();
        self.tx.send_replace(Some(text.to_string()));

        let tx = Arc::clone(&self.tx);
        let hold = self.hold;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            tx.send_replace(None);
        });
        *self.clear_task.lock().unwrap() = Some(handle);
    }

    /// Clear immediately (navigation path).
    pub fn clear(&self) {
        self.cancel_pending_clear();
        self.tx.send_replace(None);
    }

    fn cancel_pending_clear(&self) {
        if let Some(handle) = self.clear_task.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn announce_shows_immediately() {
        let feed = AlertFeed::new();
        feed.announce("scan complete");
        assert_eq!(feed.current().as_deref(), Some("scan complete"));
    }

    #[tokio::test(start_paused = true)]
    async fn auto_clears_after_hold() {
        let feed = AlertFeed::new();
        feed.announce("hello");

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(feed.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn text_survives_until_hold_elapses() {
        let feed = AlertFeed::new();
        feed.announce("hello");

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(feed.current().as_deref(), Some("hello"));
    }

    /// A second announcement restarts the window from its own call time.
    #[tokio::test(start_paused = true)]
    async fn newer_announcement_resets_the_window() {
        let feed = AlertFeed::new();
        feed.announce("first");

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        feed.announce("second");

        // 3 s after the second call — 6 s after the first — still showing.
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(feed.current().as_deref(), Some("second"));

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(feed.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_is_immediate() {
        let feed = AlertFeed::new();
        feed.announce("going away");
        feed.clear();
        assert_eq!(feed.current(), None);

        // The aborted timer must not fire later and resurrect anything.
        feed.announce("fresh");
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(feed.current().as_deref(), Some("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_updates() {
        let feed = AlertFeed::new();
        let mut rx = feed.subscribe();

        feed.announce("watch me");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_deref(), Some("watch me"));

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }
}
