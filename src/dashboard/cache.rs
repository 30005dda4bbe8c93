//! Per-process record of graphs already known to exist.
//!
//! Keyed on `(dashboard title, full metric name)`. Entries are added after a
//! graph is created or found on the board and are never evicted or expired,
//! so repeat observations skip the dashboard service entirely. The record is
//! lost on restart; the worst case is one redundant fetch per pair.

use moka::sync::Cache;

/// Thread-safe set of provisioned `(dashboard, metric)` pairs.
///
/// Backed by an unbounded moka cache with no TTL.
pub struct ProvisioningCache {
    entries: Cache<(String, String), ()>,
}

impl ProvisioningCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Whether `full_metric_name` is known to be graphed on `dashboard`.
    pub fn contains(&self, dashboard: &str, full_metric_name: &str) -> bool {
        self.entries
            .contains_key(&(dashboard.to_string(), full_metric_name.to_string()))
    }

    /// Record that `full_metric_name` is graphed on `dashboard`.
    pub fn insert(&self, dashboard: &str, full_metric_name: &str) {
        self.entries
            .insert((dashboard.to_string(), full_metric_name.to_string()), ());
    }

    /// Metrics recorded for `dashboard`, sorted. Intended for diagnostics.
    pub fn metrics_for(&self, dashboard: &str) -> Vec<String> {
        let mut metrics: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| key.0 == dashboard)
            .map(|(key, _)| key.1.clone())
            .collect();
        metrics.sort();
        metrics
    }

    /// Number of recorded pairs.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProvisioningCache {
    fn default() -> Self {
        Self::new()
    }
}
