//! Click/drag disambiguation.
//!
//! Releasing a drag also produces a click at the platform level. Clicks are
//! therefore ignored while any drag is active and for a debounce window
//! after the last drag ended.

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickGuard {
    debounce: Duration,
    active_drags: usize,
    last_drag_end: Option<Duration>,
}

impl ClickGuard {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            active_drags: 0,
            last_drag_end: None,
        }
    }

    pub fn drag_started(&mut self) {
        self.active_drags += 1;
    }

    /// `now` is the session clock at release or cancel.
    pub fn drag_ended(&mut self, now: Duration) {
        self.active_drags = self.active_drags.saturating_sub(1);
        self.last_drag_end = Some(now);
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.active_drags > 0
    }

    /// Whether a click arriving at `now` is a real click.
    #[must_use]
    pub fn accepts(&self, now: Duration) -> bool {
        if self.is_dragging() {
            return false;
        }
        match self.last_drag_end {
            Some(ended) => now.saturating_sub(ended) >= self.debounce,
            None => true,
        }
    }
}
