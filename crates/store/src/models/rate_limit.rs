//! Fixed-window request counters.

use std::time::{Duration, Instant};

/// Requests seen for one caller key in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCounter {
    pub count: u32,
    pub window_resets_at: Instant,
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimitCounter {
    pub fn new(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            window_resets_at: now + window,
        }
    }

    /// Count one request at `now`, starting a fresh window if the old one
    /// has elapsed.
    pub fn hit(&mut self, now: Instant, window: Duration, max: u32) -> RateDecision {
        if now >= self.window_resets_at {
            *self = Self::new(now, window);
        }
        if self.count >= max {
            return RateDecision::Limited {
                retry_after: self.window_resets_at - now,
            };
        }
        self.count += 1;
        RateDecision::Allowed {
            remaining: max - self.count,
        }
    }
}
