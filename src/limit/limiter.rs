//! Core fixed-window rate limiter implementation.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::backend::LimiterBackend;
use super::clock::{Clock, SystemClock};
use super::window::Decision;

/// One live counting window for a key.
#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    /// Accepted attempts in the current window
    count: u32,
    /// When the current window expires
    reset_at: Instant,
}

/// The core rate limiter that manages per-key window records.
///
/// Records are created lazily on first observation of a key and replaced
/// once expired; a denied check leaves its record untouched. The store is
/// safe to share across tasks, and each check is a single atomic
/// increment-or-create on its key.
pub struct RateLimiter {
    /// Window records indexed by composite key
    records: DashMap<String, WindowRecord>,
    /// Time source, injectable for tests
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new rate limiter with a custom time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// Check whether an attempt for `key` may proceed, given a maximum
    /// number of attempts per fixed time window.
    ///
    /// The first attempt for a fresh or expired key always succeeds and
    /// starts a new window. Once the budget is spent, every further attempt
    /// is denied until the window resets.
    pub fn check(&self, key: &str, max_attempts: u32, window: Duration) -> Decision {
        let now = self.clock.now();

        trace!(key = %key, max_attempts, "Checking rate limit");

        match self.records.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();

                if now >= record.reset_at {
                    // Window expired: replace the record, never merge
                    debug!(key = %key, "Window expired, starting fresh");
                    *record = WindowRecord {
                        count: 1,
                        reset_at: now + window,
                    };
                    return Decision {
                        allowed: true,
                        remaining: max_attempts.saturating_sub(1),
                        reset_in: window,
                    };
                }

                if record.count >= max_attempts {
                    debug!(key = %key, "Rate limit exceeded");
                    return Decision {
                        allowed: false,
                        remaining: 0,
                        reset_in: record.reset_at - now,
                    };
                }

                record.count += 1;
                Decision {
                    allowed: true,
                    remaining: max_attempts - record.count,
                    reset_in: record.reset_at - now,
                }
            }
            Entry::Vacant(vacant) => {
                debug!(key = %key, max_attempts, "Creating new window record");
                vacant.insert(WindowRecord {
                    count: 1,
                    reset_at: now + window,
                });
                Decision {
                    allowed: true,
                    remaining: max_attempts.saturating_sub(1),
                    reset_in: window,
                }
            }
        }
    }

    /// Remove all expired records, returning how many were dropped.
    ///
    /// Expiry also happens lazily on touch; this bounds memory for keys
    /// that are never seen again. Checks may run concurrently with a sweep,
    /// so removals are counted inside the retain pass rather than derived
    /// from before/after sizes.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = AtomicUsize::new(0);
        self.records.retain(|_, record| {
            if record.reset_at > now {
                true
            } else {
                removed.fetch_add(1, Ordering::Relaxed);
                false
            }
        });
        removed.into_inner()
    }

    /// Get the number of live records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Clear all records.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.records.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LimiterBackend for RateLimiter {
    async fn check(&self, key: &str, max_attempts: u32, window: Duration) -> Decision {
        RateLimiter::check(self, key, max_attempts, window)
    }
}

/// Periodically sweep expired records from the limiter.
pub async fn sweep_task(limiter: Arc<RateLimiter>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; skip it
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let removed = limiter.sweep_expired();
        debug!(removed, live = limiter.record_count(), "Swept expired records");
    }
}
