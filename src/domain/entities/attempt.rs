//! Per-client admin attempt tracking.

use chrono::{DateTime, TimeDelta, Utc};

/// Attempt counter for one client identity inside a fixed window.
///
/// The window opens at the first attempt and lasts for the gate's configured
/// duration; the next attempt after that opens a fresh window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptWindow {
    pub started_at: DateTime<Utc>,
    pub attempts: u32,
}

impl AttemptWindow {
    /// Opens a window at `now` with no attempts recorded.
    pub fn open(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            attempts: 0,
        }
    }

    /// Returns true once `window` has fully elapsed since the window opened.
    pub fn is_expired(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now - self.started_at >= window
    }

    /// Time left until the window closes, never negative.
    pub fn remaining(&self, now: DateTime<Utc>, window: TimeDelta) -> TimeDelta {
        (self.started_at + window - now).max(TimeDelta::zero())
    }
}
