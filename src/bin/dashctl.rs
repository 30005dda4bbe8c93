//! dashctl: provision dashboard graphs by hand.
//!
//! Uses the same provisioning path as the registry, for selectors that are
//! not recorded through dynmetrics (e.g. metrics from other exporters).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use dynmetrics::dashboard::{DashboardService, dashboard_uid};
use dynmetrics::{CollectorConfig, MetricsError};

/// Provision Grafana graphs for Prometheus metrics.
#[derive(Parser)]
#[command(name = "dashctl")]
#[command(version)]
#[command(about = "Provision Grafana graphs for Prometheus metrics")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the dashboard uid derived from a title.
    Uid {
        /// Dashboard title.
        title: String,
    },
    /// Ensure a graph for a selector exists on a dashboard.
    PushGraph {
        /// Path to a collector TOML config with a [dashboard] section.
        #[arg(short, long)]
        config: PathBuf,
        /// Metric selector, e.g. `shop_api_orders_total{status="error"}`.
        #[arg(short, long)]
        metric: String,
        /// Panel title.
        #[arg(short, long)]
        title: String,
        /// Graph template.
        #[arg(short, long, value_enum, default_value_t = GraphKind::Counter)]
        kind: GraphKind,
        /// Dashboard title (default: from config).
        #[arg(short, long)]
        dashboard: Option<String>,
        /// Datasource name (default: from config).
        #[arg(long)]
        datasource: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GraphKind {
    Counter,
    Timer,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Uid { title } => {
            println!("{}", dashboard_uid(&title));
        }
        Command::PushGraph {
            config,
            metric,
            title,
            kind,
            dashboard,
            datasource,
        } => {
            let config = CollectorConfig::load(&config)?;
            let dashboard_config = config.dashboard.ok_or_else(|| {
                MetricsError::Configuration("config has no [dashboard] section".to_string())
            })?;
            let service = DashboardService::from_config(&dashboard_config)?;

            let outcome = match kind {
                GraphKind::Counter => {
                    service
                        .push_counter_graph(
                            dashboard.as_deref(),
                            &metric,
                            &title,
                            datasource.as_deref(),
                        )
                        .await?
                }
                GraphKind::Timer => {
                    service
                        .push_timer_graph(
                            dashboard.as_deref(),
                            &metric,
                            &title,
                            datasource.as_deref(),
                        )
                        .await?
                }
            };
            info!(?outcome, %metric, "done");
            println!("{outcome:?}");
        }
    }

    Ok(())
}
