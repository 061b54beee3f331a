//! Repository for fixed-window rate limit counters.

use std::time::{Duration, Instant};

use crate::models::rate_limit::{RateDecision, RateLimitCounter};
use crate::table::Table;

/// A counter plus a flag set when the purge sweep unlinks it.
struct Entry {
    counter: RateLimitCounter,
    retired: bool,
}

/// Counters keyed by caller key (for example `ip` or `ip:user`).
#[derive(Default)]
pub struct RateLimitRepo {
    table: Table<String, Entry>,
}

impl RateLimitRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request for `key` at `now`.
    pub async fn hit(&self, key: &str, now: Instant, window: Duration, max: u32) -> RateDecision {
        loop {
            let row = self
                .table
                .get_or_insert_with(key.to_string(), || Entry {
                    counter: RateLimitCounter::new(now, window),
                    retired: false,
                })
                .await;
            let mut entry = row.lock().await;
            // Purged between lookup and lock; the next lookup sees a fresh row.
            if entry.retired {
                continue;
            }
            return entry.counter.hit(now, window, max);
        }
    }

    /// Drop counters whose window ended before `now`.
    ///
    /// Expiry is re-checked under the table write lock, so a counter that a
    /// concurrent `hit` just reset is kept.
    pub async fn purge_expired(&self, now: Instant) -> usize {
        let mut purged = 0;
        for key in self.table.keys().await {
            let removed = self
                .table
                .remove_if(&key, |entry| {
                    let expired = entry.counter.window_resets_at <= now;
                    entry.retired = expired;
                    expired
                })
                .await;
            if removed {
                purged += 1;
            }
        }
        purged
    }
}
