//! Process-wide default registry.
//!
//! A convenience for code that cannot thread a registry through: call
//! [`init`] once at startup and [`get`] anywhere afterwards. Libraries and
//! tests should prefer an explicit [`MetricRegistry`] passed by reference.

use std::sync::OnceLock;

use crate::config::CollectorConfig;
use crate::registry::MetricRegistry;
use crate::{MetricsError, Result};

static GLOBAL: OnceLock<MetricRegistry> = OnceLock::new();

/// Build the default registry. Fails if it was already initialized.
pub fn init(config: &CollectorConfig) -> Result<&'static MetricRegistry> {
    let registry = MetricRegistry::from_config(config)?;
    GLOBAL
        .set(registry)
        .map_err(|_| MetricsError::Configuration("global registry already initialized".into()))?;
    get().ok_or_else(|| MetricsError::Configuration("global registry unavailable".into()))
}

/// The default registry, if [`init`] has run.
pub fn get() -> Option<&'static MetricRegistry> {
    GLOBAL.get()
}
