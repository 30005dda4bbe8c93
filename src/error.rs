//! dynmetrics error types

use crate::kind::MetricKind;

/// dynmetrics error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    // Recording errors
    /// The label-name set differs from the one frozen at first observation.
    ///
    /// Nothing was recorded. Permanent until the caller fixes its labels.
    #[error(
        "invalid labels for {kind} metric '{name}': current labels {current:?}, requested labels {requested:?}"
    )]
    SchemaMismatch {
        name: String,
        kind: MetricKind,
        current: Vec<String>,
        requested: Vec<String>,
    },

    /// The exposition name is already owned by a metric of another kind.
    ///
    /// Nothing was recorded. Two kinds under one name would render two
    /// families with the same name, which scrapers reject.
    #[error(
        "metric '{name}' is already registered as a {existing}, cannot observe it as a {requested}"
    )]
    NameConflict {
        name: String,
        existing: MetricKind,
        requested: MetricKind,
    },

    // Provisioning errors (the value has already been recorded)
    #[error("dashboard provisioning is not configured")]
    NotConfigured,

    #[error("dashboard transport error: {0}")]
    Transport(String),

    #[error(
        "dashboard upsert returned status '{status}': {}",
        .message.as_deref().unwrap_or("no message")
    )]
    UpsertStatus {
        status: String,
        message: Option<String>,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MetricsError {
    /// Whether this error came from the dashboard side effect.
    ///
    /// When `true` the metric value was recorded before the failure and is
    /// not rolled back.
    pub fn is_provisioning(&self) -> bool {
        matches!(
            self,
            MetricsError::NotConfigured
                | MetricsError::Transport(_)
                | MetricsError::UpsertStatus { .. }
        )
    }
}

impl From<reqwest::Error> for MetricsError {
    fn from(err: reqwest::Error) -> Self {
        MetricsError::Transport(err.to_string())
    }
}

/// Result type alias for dynmetrics operations
pub type Result<T> = std::result::Result<T, MetricsError>;
