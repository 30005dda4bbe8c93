//! Lazy dashboard provisioning.
//!
//! [`DashboardService::ensure_graph`] makes sure a dashboard contains a graph
//! for a metric:
//!
//! 1. Resolve the dashboard (override or configured default) and datasource.
//! 2. Return early if the [`ProvisioningCache`] already knows the pair.
//! 3. Fetch the board by its title-derived uid, or scaffold an empty one.
//! 4. If any panel already queries the metric, remember that and stop.
//! 5. Otherwise append a full-width graph below the lowest panel and upsert
//!    the board without forcing overwrite.
//!
//! Steps 2–5 run under an async mutex, so concurrent requests for the same
//! pair perform a single fetch/upsert sequence. Failures are reported once
//! and never retried.

pub mod cache;
pub mod client;
pub mod layout;
pub mod model;

pub use cache::ProvisioningCache;
pub use client::{GrafanaClient, UpsertResponse, dashboard_uid};
pub use layout::{Placement, next_placement};
pub use model::{Board, GraphQuery, GridPos, Panel, Target};

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::{MetricsError, Result, telemetry};

/// A request for one graph panel.
#[derive(Debug, Clone)]
pub struct GraphRequest<'a> {
    /// Panel title.
    pub title: &'a str,
    /// Dashboard title override; falls back to the configured default.
    pub dashboard: Option<&'a str>,
    /// Datasource override; falls back to the configured default.
    pub datasource: Option<&'a str>,
    /// Name matched against existing panel expressions and cached.
    pub full_metric_name: &'a str,
    /// Query for the new panel.
    pub query: GraphQuery,
}

/// What [`DashboardService::ensure_graph`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// The pair was in the cache; no network call was made.
    Cached,
    /// The board already had a panel querying the metric.
    AlreadyPresent,
    /// A new panel was appended and the board upserted.
    Created { panel_id: u64 },
}

impl Provisioned {
    fn outcome(&self) -> &'static str {
        match self {
            Provisioned::Cached => "cached",
            Provisioned::AlreadyPresent => "existing",
            Provisioned::Created { .. } => "created",
        }
    }
}

/// Creates graph panels on demand and remembers which exist.
pub struct DashboardService {
    client: GrafanaClient,
    default_dashboard: Option<String>,
    default_datasource: Option<String>,
    cache: ProvisioningCache,
    provision_lock: Mutex<()>,
}

impl DashboardService {
    /// Create a service around an existing client.
    pub fn new(
        client: GrafanaClient,
        default_dashboard: Option<String>,
        default_datasource: Option<String>,
    ) -> Self {
        Self {
            client,
            default_dashboard,
            default_datasource,
            cache: ProvisioningCache::new(),
            provision_lock: Mutex::new(()),
        }
    }

    /// Create a service from configuration.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let client = GrafanaClient::new(
            &config.api_url,
            config.resolved_auth_key(),
            Duration::from_secs(config.request_timeout_secs),
            config.insecure_skip_verify,
        )?;
        Ok(Self::new(
            client,
            config.default_dashboard.clone(),
            config.default_datasource.clone(),
        ))
    }

    pub fn cache(&self) -> &ProvisioningCache {
        &self.cache
    }

    pub fn client(&self) -> &GrafanaClient {
        &self.client
    }

    /// Ensure the requested graph exists.
    pub async fn ensure_graph(&self, request: GraphRequest<'_>) -> Result<Provisioned> {
        let result = self.provision(&request).await;
        let outcome = match &result {
            Ok(done) => done.outcome(),
            Err(_) => "error",
        };
        metrics::counter!(telemetry::DASHBOARD_PROVISIONS_TOTAL, "outcome" => outcome)
            .increment(1);
        if let Err(e) = &result {
            warn!(
                metric = request.full_metric_name,
                title = request.title,
                error = %e,
                "dashboard provisioning failed"
            );
        }
        result
    }

    /// Provision a counter graph for an arbitrary selector.
    ///
    /// `selector` is used verbatim in the query, so it may carry label
    /// matchers (`orders_total{status="error"}`).
    pub async fn push_counter_graph(
        &self,
        dashboard: Option<&str>,
        selector: &str,
        title: &str,
        datasource: Option<&str>,
    ) -> Result<Provisioned> {
        self.ensure_graph(GraphRequest {
            title,
            dashboard,
            datasource,
            full_metric_name: selector,
            query: GraphQuery::counter(selector),
        })
        .await
    }

    /// Provision a timer graph for an arbitrary selector.
    pub async fn push_timer_graph(
        &self,
        dashboard: Option<&str>,
        selector: &str,
        title: &str,
        datasource: Option<&str>,
    ) -> Result<Provisioned> {
        self.ensure_graph(GraphRequest {
            title,
            dashboard,
            datasource,
            full_metric_name: selector,
            query: GraphQuery::timer(selector),
        })
        .await
    }

    async fn provision(&self, request: &GraphRequest<'_>) -> Result<Provisioned> {
        let dashboard = request
            .dashboard
            .or(self.default_dashboard.as_deref())
            .ok_or(MetricsError::NotConfigured)?;
        let datasource = request.datasource.or(self.default_datasource.as_deref());
        let metric = request.full_metric_name;

        if self.cache.contains(dashboard, metric) {
            debug!(dashboard, metric, "graph already provisioned");
            return Ok(Provisioned::Cached);
        }

        let _guard = self.provision_lock.lock().await;
        // another task may have finished while we waited
        if self.cache.contains(dashboard, metric) {
            return Ok(Provisioned::Cached);
        }

        let uid = dashboard_uid(dashboard);
        let mut board = match self.client.get_dashboard_by_uid(&uid).await? {
            Some(board) => board,
            None => {
                info!(dashboard, %uid, "scaffolding new dashboard");
                Board::scaffold(dashboard, uid.clone())
            }
        };

        if board.queries_metric(metric) {
            debug!(dashboard, metric, "graph found on dashboard");
            self.cache.insert(dashboard, metric);
            return Ok(Provisioned::AlreadyPresent);
        }

        let placement = next_placement(&board.panels);
        let panel = model::graph_panel(
            placement.id,
            request.title,
            placement.grid_pos(),
            &request.query,
            datasource,
        )?;
        board.panels.push(panel);

        self.client.set_dashboard(&board).await?;
        self.cache.insert(dashboard, metric);
        info!(
            dashboard,
            metric,
            panel_id = placement.id,
            y = placement.y,
            "graph panel created"
        );
        Ok(Provisioned::Created {
            panel_id: placement.id,
        })
    }
}
