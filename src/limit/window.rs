//! Time windows and limiter decisions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time window for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// Per-second rate limiting
    Second,
    /// Per-minute rate limiting
    Minute,
    /// Per-hour rate limiting
    Hour,
    /// Per-day rate limiting
    Day,
}

impl TimeWindow {
    /// Get the duration of this time window.
    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::Second => Duration::from_secs(1),
            TimeWindow::Minute => Duration::from_secs(60),
            TimeWindow::Hour => Duration::from_secs(3600),
            TimeWindow::Day => Duration::from_secs(86400),
        }
    }
}

/// The outcome of a single rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the attempt may proceed
    pub allowed: bool,
    /// Budget left in the current window after this check
    pub remaining: u32,
    /// Time until the current window resets
    pub reset_in: Duration,
}

impl Decision {
    /// The `Retry-After` value for this decision, in whole seconds.
    ///
    /// Rounded up so a denial never advertises a zero-second wait.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_in.as_millis().div_ceil(1000) as u64
    }
}
