//! Core Collector trait

use std::time::Instant;

use async_trait::async_trait;

use crate::Result;
use crate::labels::Labels;

/// The observation API application code records metrics through.
///
/// Metrics are identified by name and created on first use. Each call may
/// carry directive labels (see [`labels`](crate::labels)) asking for a
/// dashboard graph; a provisioning error is returned only after the value
/// has been recorded.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Record the wall-clock time elapsed since `start`, in nanoseconds,
    /// into a quantile summary.
    async fn observe_timer(&self, name: &str, start: Instant, labels: &Labels) -> Result<()>;

    /// Record the seconds elapsed since `start` into a fixed-bucket histogram.
    async fn observe_histogram(&self, name: &str, start: Instant, labels: &Labels) -> Result<()>;

    /// Add `delta` to a monotonic counter.
    async fn observe_counter(&self, name: &str, delta: u64, labels: &Labels) -> Result<()>;

    /// Set a gauge to `value`.
    async fn observe_gauge(&self, name: &str, value: f64, labels: &Labels) -> Result<()>;
}
