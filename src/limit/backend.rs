//! Limiter trait for abstracting the record store.

use async_trait::async_trait;
use std::time::Duration;

use super::window::Decision;

/// Trait for limiter implementations.
///
/// The HTTP service and the [`Gate`] work against this trait so the
/// in-process record store can later be swapped for an external key-value
/// store without changing call sites.
///
/// [`Gate`]: super::Gate
#[async_trait]
pub trait LimiterBackend: Send + Sync {
    /// Check whether an attempt for `key` may proceed under the given budget.
    async fn check(&self, key: &str, max_attempts: u32, window: Duration) -> Decision;
}
