//! Quiet-window debouncing for search input.
//!
//! The debouncer holds no timer of its own. Its owner reads [`Debouncer::deadline`]
//! and sleeps until it, then calls [`Debouncer::commit`]. Dropping or
//! cancelling the debouncer therefore leaves nothing behind that could fire
//! later.

use std::time::Duration;

use tokio::time::Instant;

/// Default quiet window after the last keystroke.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<String>,
    deadline: Option<Instant>,
    last_committed: String,
}

impl Debouncer {
    /// `committed` is the text already applied to the query, so typing it
    /// again does not produce a commit.
    pub fn new(window: Duration, committed: impl Into<String>) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
            last_committed: committed.into(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a keystroke. Re-arms the quiet window.
    pub fn push(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some(text.into());
        self.deadline = Some(now + self.window);
    }

    /// When the pending text becomes committable, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending text once the quiet window has elapsed.
    ///
    /// Returns `None` before the deadline, when nothing is pending, or when
    /// the text equals the last committed value.
    pub fn commit(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        let text = self.pending.take()?;
        if text == self.last_committed {
            return None;
        }
        self.last_committed = text.clone();
        Some(text)
    }

    /// Drop any pending text without committing it.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    /// Align with a search text applied by other means (e.g. a direct set).
    pub fn reset_committed(&mut self, text: impl Into<String>) {
        self.cancel();
        self.last_committed = text.into();
    }
}
