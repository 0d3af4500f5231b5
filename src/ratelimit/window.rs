// Quota window accounting
// Author: kelexine (https://github.com/kelexine)

use tokio::time::{Duration, Instant};

/// Characters submitted since the start of the current accounting window.
///
/// Pure state: it never resets itself. [`super::RateGate`] decides when a
/// reset happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaWindow {
    accumulated_characters: u64,
    window_start: Instant,
}

impl QuotaWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            accumulated_characters: 0,
            window_start: now,
        }
    }

    pub fn accumulated_characters(&self) -> u64 {
        self.accumulated_characters
    }

    /// Add a request's characters and return the new total.
    pub fn record(&mut self, characters: u64) -> u64 {
        self.accumulated_characters = self.accumulated_characters.saturating_add(characters);
        self.accumulated_characters
    }

    pub fn is_over(&self, character_limit: u64) -> bool {
        self.accumulated_characters > character_limit
    }

    /// Time since the window opened. Zero if `now` predates the window.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.window_start)
    }

    /// How long until the window has been open for `delay_limit`.
    pub fn remaining(&self, now: Instant, delay_limit: Duration) -> Duration {
        delay_limit.saturating_sub(self.elapsed(now))
    }

    pub fn reset(&mut self, now: Instant) {
        self.accumulated_characters = 0;
        self.window_start = now;
    }
}
