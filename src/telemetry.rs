//! Telemetry metric name constants.
//!
//! These describe dynmetrics' own behaviour, not the dynamic metrics it
//! records. They go through the global `metrics` facade: hosts install
//! their own recorder (e.g. prometheus, statsd); without a recorder
//! installed, all calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `dynmetrics_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `kind`: metric kind: "counter", "timer", "histogram" or "gauge"
//! - `outcome`: provisioning outcome: "cached", "existing", "created" or "error"

/// Observations refused because their label names differ from the frozen schema.
///
/// Labels: `kind`.
pub const SCHEMA_MISMATCHES_TOTAL: &str = "dynmetrics_schema_mismatches_total";

/// Dashboard provisioning attempts.
///
/// Labels: `outcome` ("cached" | "existing" | "created" | "error").
pub const DASHBOARD_PROVISIONS_TOTAL: &str = "dynmetrics_dashboard_provisions_total";
