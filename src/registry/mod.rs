//! Dynamic metric registry with frozen label schemas.
//!
//! Metrics are created on first observation. The sorted set of data-label
//! names seen then becomes the metric's schema; later observations of the
//! same (kind, name) must supply exactly the same names or they are refused
//! with [`MetricsError::SchemaMismatch`] and nothing is recorded.
//!
//! An exposition name belongs to the kind that created it. Observing it as
//! another kind fails with [`MetricsError::NameConflict`], so every family
//! in [`MetricRegistry::render`] has exactly one type.
//!
//! # Locking
//!
//! A single mutex per registry covers the check-or-create step, so two
//! racing first observations cannot freeze different schemas. Values are
//! recorded after it is released; the aggregators are safe for concurrent
//! use. The mutex is not held during dashboard provisioning: provisioning is serialised by the
//! [`DashboardService`]'s own async lock instead, so observations without
//! directives never wait on a remote round trip.
//!
//! # Provisioning
//!
//! When an observation carries the graph-title directive, the registry asks
//! the dashboard service for a panel after the value is recorded. A
//! provisioning error is returned to the caller but the value stays
//! recorded.

mod exposition;

pub use exposition::{HISTOGRAM_BUCKETS, INSTANCE_LABEL, TIMER_QUANTILES};

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{CollectorConfig, DashboardConfig};
use crate::dashboard::{DashboardService, GraphQuery, GraphRequest};
use crate::kind::{MetricKind, full_metric_name};
use crate::labels::{DataLabels, Directives, LabelSchema, Labels, partition};
use crate::traits::Collector;
use crate::{MetricsError, Result, telemetry};
use exposition::Aggregators;

/// A metric as frozen at its first observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub name: String,
    pub kind: MetricKind,
    pub schema: LabelSchema,
}

#[derive(Default)]
struct Definitions {
    by_kind: HashMap<(MetricKind, String), MetricDefinition>,
    /// Exposition name to the kind that owns it.
    owners: HashMap<String, MetricKind>,
}

/// Owns metric definitions and their live aggregators.
pub struct MetricRegistry {
    instance: String,
    namespace: String,
    subsystem: String,
    definitions: Mutex<Definitions>,
    aggregators: Aggregators,
    dashboards: Option<DashboardService>,
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("instance", &self.instance)
            .field("namespace", &self.namespace)
            .field("subsystem", &self.subsystem)
            .finish_non_exhaustive()
    }
}

impl MetricRegistry {
    /// Create a new builder for configuring the registry.
    pub fn builder() -> MetricRegistryBuilder {
        MetricRegistryBuilder::new()
    }

    /// Build a registry from configuration.
    pub fn from_config(config: &CollectorConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .instance(&config.instance)
            .namespace(&config.namespace)
            .subsystem(&config.subsystem);
        if let Some(dashboard) = &config.dashboard {
            builder = builder.dashboard(dashboard.clone());
        }
        builder.build()
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Exposition name of `name`: `namespace_subsystem_name`.
    pub fn full_name(&self, name: &str) -> String {
        full_metric_name(&self.namespace, &self.subsystem, name)
    }

    /// The dashboard service, when provisioning is configured.
    pub fn dashboards(&self) -> Option<&DashboardService> {
        self.dashboards.as_ref()
    }

    /// The frozen definition of a metric, if it has been observed.
    pub fn definition(&self, kind: MetricKind, name: &str) -> Option<MetricDefinition> {
        self.definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_kind
            .get(&(kind, name.to_string()))
            .cloned()
    }

    /// All definitions, ordered by kind then name.
    pub fn definitions(&self) -> Vec<MetricDefinition> {
        let mut defs: Vec<_> = self
            .definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_kind
            .values()
            .cloned()
            .collect();
        defs.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        defs
    }

    /// Prometheus text exposition of every metric in this registry.
    pub fn render(&self) -> String {
        self.aggregators.render()
    }

    /// Check the label schema, creating the definition on first use.
    ///
    /// Returns the full metric name on success.
    fn admit(&self, kind: MetricKind, name: &str, data: &DataLabels) -> Result<String> {
        let requested = LabelSchema::of(data);
        let full_name = self.full_name(name);
        let mut definitions = self
            .definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(&existing) = definitions.owners.get(&full_name).filter(|&&k| k != kind) {
            warn!(
                metric = name,
                %existing,
                requested = %kind,
                "metric name already used by another kind"
            );
            return Err(MetricsError::NameConflict {
                name: full_name,
                existing,
                requested: kind,
            });
        }

        match definitions.by_kind.get(&(kind, name.to_string())) {
            Some(existing) if existing.schema == requested => Ok(full_name),
            Some(existing) => {
                metrics::counter!(telemetry::SCHEMA_MISMATCHES_TOTAL, "kind" => kind.as_str())
                    .increment(1);
                warn!(
                    metric = name,
                    %kind,
                    current = ?existing.schema.names(),
                    requested = ?requested.names(),
                    "label schema mismatch"
                );
                Err(MetricsError::SchemaMismatch {
                    name: name.to_string(),
                    kind,
                    current: existing.schema.names().to_vec(),
                    requested: requested.into_names(),
                })
            }
            None => {
                debug!(metric = name, %kind, labels = ?requested.names(), "creating metric");
                self.aggregators
                    .describe(kind, &full_name, format!("dynamic metric {name}"));
                definitions.owners.insert(full_name.clone(), kind);
                definitions.by_kind.insert(
                    (kind, name.to_string()),
                    MetricDefinition {
                        name: name.to_string(),
                        kind,
                        schema: requested,
                    },
                );
                Ok(full_name)
            }
        }
    }

    /// Provision a graph if the directives ask for one.
    async fn provision(
        &self,
        kind: MetricKind,
        full_name: &str,
        directives: &Directives,
    ) -> Result<()> {
        let Some(title) = directives.graph_title.as_deref() else {
            return Ok(());
        };
        // histograms are never graphed, so they need no backend
        if kind == MetricKind::Histogram {
            debug!(metric = full_name, "histograms are not graphed");
            return Ok(());
        }
        let service = self.dashboards.as_ref().ok_or(MetricsError::NotConfigured)?;
        let query = match kind {
            MetricKind::Counter => GraphQuery::counter(full_name),
            MetricKind::Timer => GraphQuery::timer(full_name),
            MetricKind::Histogram | MetricKind::Gauge => {
                debug!(metric = full_name, %kind, "no graph template for kind");
                return Ok(());
            }
        };
        service
            .ensure_graph(GraphRequest {
                title,
                dashboard: directives.dashboard.as_deref(),
                datasource: directives.datasource.as_deref(),
                full_metric_name: full_name,
                query,
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Collector for MetricRegistry {
    async fn observe_timer(&self, name: &str, start: Instant, labels: &Labels) -> Result<()> {
        let (data, directives) = partition(labels);
        let full_name = self.admit(MetricKind::Timer, name, &data)?;
        let nanos = start.elapsed().as_nanos() as f64;
        self.aggregators.timer(&full_name, &data).record(nanos);
        self.provision(MetricKind::Timer, &full_name, &directives)
            .await
    }

    async fn observe_histogram(&self, name: &str, start: Instant, labels: &Labels) -> Result<()> {
        let (data, directives) = partition(labels);
        let full_name = self.admit(MetricKind::Histogram, name, &data)?;
        let seconds = start.elapsed().as_secs_f64();
        self.aggregators.histogram(&full_name, &data).record(seconds);
        self.provision(MetricKind::Histogram, &full_name, &directives)
            .await
    }

    async fn observe_counter(&self, name: &str, delta: u64, labels: &Labels) -> Result<()> {
        let (data, directives) = partition(labels);
        let full_name = self.admit(MetricKind::Counter, name, &data)?;
        self.aggregators.counter(&full_name, &data).increment(delta);
        self.provision(MetricKind::Counter, &full_name, &directives)
            .await
    }

    async fn observe_gauge(&self, name: &str, value: f64, labels: &Labels) -> Result<()> {
        let (data, directives) = partition(labels);
        let full_name = self.admit(MetricKind::Gauge, name, &data)?;
        self.aggregators.gauge(&full_name, &data).set(value);
        self.provision(MetricKind::Gauge, &full_name, &directives)
            .await
    }
}

/// Builder for [`MetricRegistry`].
pub struct MetricRegistryBuilder {
    instance: String,
    namespace: String,
    subsystem: String,
    dashboard: Option<DashboardConfig>,
    dashboard_service: Option<DashboardService>,
}

impl MetricRegistryBuilder {
    pub fn new() -> Self {
        Self {
            instance: "unknown".to_string(),
            namespace: String::new(),
            subsystem: String::new(),
            dashboard: None,
            dashboard_service: None,
        }
    }

    /// Instance or pod identifier attached to every series.
    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    /// Enable dashboard provisioning from configuration.
    pub fn dashboard(mut self, config: DashboardConfig) -> Self {
        self.dashboard = Some(config);
        self
    }

    /// Enable dashboard provisioning with a prebuilt service.
    ///
    /// Takes precedence over [`dashboard()`](Self::dashboard).
    pub fn dashboard_service(mut self, service: DashboardService) -> Self {
        self.dashboard_service = Some(service);
        self
    }

    pub fn build(self) -> Result<MetricRegistry> {
        let dashboards = match (self.dashboard_service, self.dashboard) {
            (Some(service), _) => Some(service),
            (None, Some(config)) => Some(DashboardService::from_config(&config)?),
            (None, None) => None,
        };

        Ok(MetricRegistry {
            aggregators: Aggregators::new(&self.instance)?,
            instance: self.instance,
            namespace: self.namespace,
            subsystem: self.subsystem,
            definitions: Mutex::new(Definitions::default()),
            dashboards,
        })
    }
}

impl Default for MetricRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
