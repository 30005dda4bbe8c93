//! dynmetrics - ad-hoc Prometheus metrics with lazy Grafana graphs
//!
//! Application code records timers, counters, histograms and gauges by
//! name, without declaring them first. The first observation of a name
//! freezes its label schema; later observations with different label names
//! are refused. Observations carrying a `grafana_graph_title` label also
//! make sure a matching graph panel exists on a Grafana dashboard.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use dynmetrics::{Collector, DashboardConfig, MetricRegistry, labels};
//!
//! #[tokio::main]
//! async fn main() -> dynmetrics::Result<()> {
//!     let registry = MetricRegistry::builder()
//!         .instance("orders-7d9f")
//!         .namespace("shop")
//!         .subsystem("api")
//!         .dashboard(
//!             DashboardConfig::new("https://grafana.example.com")
//!                 .auth_key("glsa_your_key")
//!                 .default_dashboard("Shop API"),
//!         )
//!         .build()?;
//!
//!     let start = Instant::now();
//!     // ... handle a request ...
//!     registry
//!         .observe_timer(
//!             "checkout_time",
//!             start,
//!             &labels([("has_error", "false"), ("grafana_graph_title", "Checkout time")]),
//!         )
//!         .await?;
//!
//!     println!("{}", registry.render());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod global;
pub mod kind;
pub mod labels;
pub mod noop;
pub mod registry;
pub mod telemetry;
pub mod traits;

// Re-export main types at crate root
pub use config::{CollectorConfig, DashboardConfig};
pub use dashboard::{DashboardService, GraphRequest, Provisioned, ProvisioningCache};
pub use error::{MetricsError, Result};
pub use kind::{MetricKind, full_metric_name};
pub use labels::{Directives, LabelSchema, Labels, labels, partition};
pub use noop::NoopCollector;
pub use registry::{MetricDefinition, MetricRegistry, MetricRegistryBuilder};
pub use traits::Collector;
