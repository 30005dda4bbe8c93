//! Collector configuration.
//!
//! Usually built in code, but can also be loaded from TOML:
//!
//! ```toml
//! instance = "orders-7d9f"
//! namespace = "shop"
//! subsystem = "api"
//!
//! [dashboard]
//! api_url = "https://grafana.example.com"
//! default_dashboard = "Shop API"
//! default_datasource = "prometheus-10s"
//! ```
//!
//! The dashboard API key may be omitted from the file and supplied through
//! the `GRAFANA_API_KEY` environment variable instead.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::{MetricsError, Result};

/// Environment variable consulted when `auth_key` is not configured.
pub const AUTH_KEY_ENV: &str = "GRAFANA_API_KEY";

/// Registry construction inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Instance or pod identifier, attached to every series as `podname`.
    #[serde(default = "default_instance")]
    pub instance: String,
    /// Metric name prefix.
    #[serde(default)]
    pub namespace: String,
    /// Second metric name prefix, after the namespace.
    #[serde(default)]
    pub subsystem: String,
    /// Dashboard provisioning; absent disables it.
    #[serde(default)]
    pub dashboard: Option<DashboardConfig>,
}

/// Dashboard provisioning backend.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the Grafana API.
    pub api_url: String,
    /// Bearer token for the API.
    #[serde(default)]
    pub auth_key: Option<String>,
    /// Dashboard used when an observation does not name one.
    #[serde(default)]
    pub default_dashboard: Option<String>,
    /// Datasource used when an observation does not name one.
    #[serde(default)]
    pub default_datasource: Option<String>,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Skip TLS certificate verification (default: false).
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_instance() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_timeout() -> u64 {
    30
}

impl CollectorConfig {
    /// Config without dashboard provisioning.
    pub fn new(
        instance: impl Into<String>,
        namespace: impl Into<String>,
        subsystem: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            namespace: namespace.into(),
            subsystem: subsystem.into(),
            dashboard: None,
        }
    }

    /// Enable dashboard provisioning.
    pub fn with_dashboard(mut self, dashboard: DashboardConfig) -> Self {
        self.dashboard = Some(dashboard);
        self
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MetricsError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::parse(&content).map_err(|e| {
            MetricsError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl DashboardConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            auth_key: None,
            default_dashboard: None,
            default_datasource: None,
            request_timeout_secs: default_timeout(),
            insecure_skip_verify: false,
        }
    }

    pub fn auth_key(mut self, key: impl Into<String>) -> Self {
        self.auth_key = Some(key.into());
        self
    }

    pub fn default_dashboard(mut self, dashboard: impl Into<String>) -> Self {
        self.default_dashboard = Some(dashboard.into());
        self
    }

    pub fn default_datasource(mut self, datasource: impl Into<String>) -> Self {
        self.default_datasource = Some(datasource.into());
        self
    }

    /// Configured key, falling back to `GRAFANA_API_KEY`.
    pub fn resolved_auth_key(&self) -> Option<String> {
        self.auth_key
            .clone()
            .or_else(|| std::env::var(AUTH_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }
}
