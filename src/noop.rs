//! Collector that records nothing.

use std::time::Instant;

use async_trait::async_trait;

use crate::Result;
use crate::labels::Labels;
use crate::traits::Collector;

/// A [`Collector`] for disabled-metrics and test contexts.
///
/// Every observation succeeds and has no effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollector;

#[async_trait]
impl Collector for NoopCollector {
    async fn observe_timer(&self, _name: &str, _start: Instant, _labels: &Labels) -> Result<()> {
        Ok(())
    }

    async fn observe_histogram(
        &self,
        _name: &str,
        _start: Instant,
        _labels: &Labels,
    ) -> Result<()> {
        Ok(())
    }

    async fn observe_counter(&self, _name: &str, _delta: u64, _labels: &Labels) -> Result<()> {
        Ok(())
    }

    async fn observe_gauge(&self, _name: &str, _value: f64, _labels: &Labels) -> Result<()> {
        Ok(())
    }
}
