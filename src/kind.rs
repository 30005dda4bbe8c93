//! Metric kinds.

use std::fmt;

/// The aggregator family a metric name belongs to.
///
/// Definitions are keyed by kind and name, but an exposition name is owned
/// by the kind that first used it; see
/// [`MetricsError::NameConflict`](crate::MetricsError::NameConflict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    /// Monotonic counter, incremented by a delta.
    Counter,
    /// Elapsed wall-clock time in nanoseconds, summarised by quantiles.
    Timer,
    /// Elapsed seconds in fixed buckets.
    Histogram,
    /// Absolute value, overwritten on each observation.
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Timer => "timer",
            MetricKind::Histogram => "histogram",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join the non-empty parts of `namespace`, `subsystem` and `name` with `_`.
///
/// ```rust
/// # use dynmetrics::kind::full_metric_name;
/// assert_eq!(full_metric_name("shop", "api", "orders_total"), "shop_api_orders_total");
/// assert_eq!(full_metric_name("shop", "", "orders_total"), "shop_orders_total");
/// ```
pub fn full_metric_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
