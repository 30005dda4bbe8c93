//! Label partitioning and label schemas.
//!
//! Callers pass one flat label map per observation. Three reserved keys are
//! not data: they steer dashboard provisioning and are split off before any
//! schema comparison, so they never reach a metric's label schema.
//!
//! | key                       | meaning                                   |
//! |---------------------------|-------------------------------------------|
//! | `grafana_graph_title`     | graph title; its presence triggers a graph|
//! | `grafana_dashboard_title` | dashboard override                        |
//! | `grafana_datasource`      | datasource override                       |

use std::collections::{BTreeMap, HashMap};

/// Label map supplied by callers. Key order is irrelevant.
pub type Labels = HashMap<String, String>;

/// Data labels after partitioning, ordered by name.
pub type DataLabels = BTreeMap<String, String>;

/// Reserved key carrying the graph title.
pub const GRAPH_TITLE_LABEL: &str = "grafana_graph_title";

/// Reserved key overriding the target dashboard.
pub const DASHBOARD_LABEL: &str = "grafana_dashboard_title";

/// Reserved key overriding the panel datasource.
pub const DATASOURCE_LABEL: &str = "grafana_datasource";

/// The reserved directive keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    GraphTitle,
    Dashboard,
    Datasource,
}

impl Directive {
    pub const ALL: [Directive; 3] = [
        Directive::GraphTitle,
        Directive::Dashboard,
        Directive::Datasource,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Directive::GraphTitle => GRAPH_TITLE_LABEL,
            Directive::Dashboard => DASHBOARD_LABEL,
            Directive::Datasource => DATASOURCE_LABEL,
        }
    }

    /// Map a label key to its directive, if it is reserved.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.key() == key)
    }
}

/// Directive values extracted from one observation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub graph_title: Option<String>,
    pub dashboard: Option<String>,
    pub datasource: Option<String>,
}

impl Directives {
    /// Whether a graph should be provisioned for this observation.
    pub fn wants_graph(&self) -> bool {
        self.graph_title.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.graph_title.is_none() && self.dashboard.is_none() && self.datasource.is_none()
    }

    fn set(&mut self, directive: Directive, value: String) {
        let slot = match directive {
            Directive::GraphTitle => &mut self.graph_title,
            Directive::Dashboard => &mut self.dashboard,
            Directive::Datasource => &mut self.datasource,
        };
        *slot = Some(value);
    }
}

/// Split a label map into data labels and directives.
///
/// ```rust
/// # use dynmetrics::labels::{partition, Labels};
/// let labels = Labels::from([
///     ("status".to_string(), "ok".to_string()),
///     ("grafana_graph_title".to_string(), "Orders".to_string()),
/// ]);
/// let (data, directives) = partition(&labels);
/// assert_eq!(data.len(), 1);
/// assert_eq!(directives.graph_title.as_deref(), Some("Orders"));
/// ```
pub fn partition(labels: &Labels) -> (DataLabels, Directives) {
    let mut data = DataLabels::new();
    let mut directives = Directives::default();
    for (key, value) in labels {
        match Directive::from_key(key) {
            Some(directive) => directives.set(directive, value.clone()),
            None => {
                data.insert(key.clone(), value.clone());
            }
        }
    }
    (data, directives)
}

/// Sorted set of label names frozen for a metric at first observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelSchema(Vec<String>);

impl LabelSchema {
    /// Schema of a data-label map: its names in sorted order.
    pub fn of(labels: &DataLabels) -> Self {
        Self(labels.keys().cloned().collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn into_names(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build a [`Labels`] map from string pairs.
pub fn labels<K, V, I>(pairs: I) -> Labels
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
