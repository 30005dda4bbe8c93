//! Live aggregators and their Prometheus text exposition.
//!
//! Each registry owns two private `metrics-exporter-prometheus` recorders
//! rather than touching the global one, so independent registries (and
//! tests) never share series:
//!
//! - `summaries` renders histograms as quantile summaries and holds timers,
//!   counters and gauges.
//! - `buckets` renders histograms with [`HISTOGRAM_BUCKETS`].
//!
//! Both attach `podname=<instance>` to every series.

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use crate::kind::MetricKind;
use crate::labels::DataLabels;
use crate::{MetricsError, Result};

/// Constant label identifying the owning instance.
pub const INSTANCE_LABEL: &str = "podname";

/// Quantiles reported for timers.
pub const TIMER_QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

/// Histogram bucket upper bounds, in seconds.
pub const HISTOGRAM_BUCKETS: [f64; 14] = [
    0.1, 0.25, 0.5, 0.75, 0.85, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 6.0, 8.0, 10.0,
];

pub(crate) struct Aggregators {
    summaries: PrometheusRecorder,
    summaries_handle: PrometheusHandle,
    buckets: PrometheusRecorder,
    buckets_handle: PrometheusHandle,
}

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}

fn key(full_name: &str, labels: &DataLabels) -> Key {
    let labels: Vec<Label> = labels
        .iter()
        .map(|(name, value)| Label::new(name.clone(), value.clone()))
        .collect();
    Key::from_parts(full_name.to_string(), labels)
}

impl Aggregators {
    pub(crate) fn new(instance: &str) -> Result<Self> {
        let summaries = PrometheusBuilder::new()
            .add_global_label(INSTANCE_LABEL, instance)
            .set_quantiles(&TIMER_QUANTILES)
            .map_err(|e| MetricsError::Configuration(format!("invalid timer quantiles: {e}")))?
            .build_recorder();
        let buckets = PrometheusBuilder::new()
            .add_global_label(INSTANCE_LABEL, instance)
            .set_buckets(&HISTOGRAM_BUCKETS)
            .map_err(|e| MetricsError::Configuration(format!("invalid histogram buckets: {e}")))?
            .build_recorder();

        Ok(Self {
            summaries_handle: summaries.handle(),
            summaries,
            buckets_handle: buckets.handle(),
            buckets,
        })
    }

    /// Attach help text to a newly created metric.
    pub(crate) fn describe(&self, kind: MetricKind, full_name: &str, help: String) {
        let name = KeyName::from(full_name.to_string());
        match kind {
            MetricKind::Counter => self.summaries.describe_counter(name, None, help.into()),
            MetricKind::Gauge => self.summaries.describe_gauge(name, None, help.into()),
            MetricKind::Timer => self.summaries.describe_histogram(name, None, help.into()),
            MetricKind::Histogram => self.buckets.describe_histogram(name, None, help.into()),
        }
    }

    pub(crate) fn counter(&self, full_name: &str, labels: &DataLabels) -> Counter {
        self.summaries
            .register_counter(&key(full_name, labels), &metadata())
    }

    pub(crate) fn gauge(&self, full_name: &str, labels: &DataLabels) -> Gauge {
        self.summaries
            .register_gauge(&key(full_name, labels), &metadata())
    }

    pub(crate) fn timer(&self, full_name: &str, labels: &DataLabels) -> Histogram {
        self.summaries
            .register_histogram(&key(full_name, labels), &metadata())
    }

    pub(crate) fn histogram(&self, full_name: &str, labels: &DataLabels) -> Histogram {
        self.buckets
            .register_histogram(&key(full_name, labels), &metadata())
    }

    /// Prometheus text exposition of every aggregator.
    pub(crate) fn render(&self) -> String {
        let mut out = self.summaries_handle.render();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.buckets_handle.render());
        out
    }
}
