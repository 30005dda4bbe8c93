//! Tests for dynmetrics' own telemetry.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use dynmetrics::dashboard::dashboard_uid;
use dynmetrics::labels::GRAPH_TITLE_LABEL;
use dynmetrics::{Collector, DashboardConfig, MetricRegistry, labels, telemetry};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum counter values matching a metric name and one label pair.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: (&str, &str)) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            key.key()
                .labels()
                .any(|l| l.key() == label.0 && l.value() == label.1)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn schema_mismatch_is_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let registry = MetricRegistry::builder()
        .namespace("shop")
        .subsystem("api")
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                registry
                    .observe_counter("orders_total", 1, &labels([("status", "ok")]))
                    .await
                    .unwrap();
                let _ = registry
                    .observe_counter("orders_total", 1, &labels([("region", "eu")]))
                    .await;
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let count = counter_with_label(
        &snapshot,
        telemetry::SCHEMA_MISMATCHES_TOTAL,
        ("kind", "counter"),
    );
    assert_eq!(count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn provisioning_outcomes_are_counted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/dashboards/uid/{}", dashboard_uid("Shop"))))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dashboards/db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(&server)
        .await;

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let registry = MetricRegistry::builder()
        .namespace("shop")
        .subsystem("api")
        .dashboard(DashboardConfig::new(server.uri()).default_dashboard("Shop"))
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                for _ in 0..2 {
                    registry
                        .observe_counter(
                            "orders_total",
                            1,
                            &labels([(GRAPH_TITLE_LABEL, "Orders")]),
                        )
                        .await
                        .unwrap();
                }
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let provisions = telemetry::DASHBOARD_PROVISIONS_TOTAL;
    assert_eq!(
        counter_with_label(&snapshot, provisions, ("outcome", "created")),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, provisions, ("outcome", "cached")),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, provisions, ("outcome", "error")),
        0
    );
}

#[tokio::test]
async fn telemetry_is_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let registry = MetricRegistry::builder().build().unwrap();
    registry
        .observe_counter("c", 1, &labels([("a", "b")]))
        .await
        .unwrap();
    let _ = registry.observe_counter("c", 1, &labels([("x", "y")])).await;
}
