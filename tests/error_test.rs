use dynmetrics::{MetricKind, MetricsError, Result};

#[test]
fn schema_mismatch_display_names_both_schemas() {
    let err = MetricsError::SchemaMismatch {
        name: "orders_total".into(),
        kind: MetricKind::Counter,
        current: vec!["status".into()],
        requested: vec!["region".into(), "status".into()],
    };
    let msg = err.to_string();
    assert!(msg.contains("orders_total"));
    assert!(msg.contains("counter"));
    assert!(msg.contains(r#"["status"]"#));
    assert!(msg.contains(r#"["region", "status"]"#));
}

#[test]
fn upsert_status_display() {
    let err = MetricsError::UpsertStatus {
        status: "version-mismatch".into(),
        message: Some("changed by someone else".into()),
    };
    let msg = err.to_string();
    assert!(msg.contains("version-mismatch"));
    assert!(msg.contains("changed by someone else"));

    let bare = MetricsError::UpsertStatus {
        status: "failed".into(),
        message: None,
    };
    assert!(bare.to_string().contains("no message"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(MetricsError::NotConfigured)
    }
    assert!(returns_error().is_err());
}

// ============================================================================
// Provisioning classification
// ============================================================================

#[test]
fn provisioning_errors() {
    assert!(MetricsError::NotConfigured.is_provisioning());
    assert!(MetricsError::Transport("connection reset".into()).is_provisioning());
    assert!(
        MetricsError::UpsertStatus {
            status: "failed".into(),
            message: None
        }
        .is_provisioning()
    );
}

#[test]
fn recording_errors() {
    assert!(
        !MetricsError::SchemaMismatch {
            name: "x".into(),
            kind: MetricKind::Gauge,
            current: vec![],
            requested: vec!["a".into()],
        }
        .is_provisioning()
    );
    assert!(
        !MetricsError::NameConflict {
            name: "shop_api_work".into(),
            existing: MetricKind::Counter,
            requested: MetricKind::Timer,
        }
        .is_provisioning()
    );
    assert!(!MetricsError::Configuration("x".into()).is_provisioning());
}

#[test]
fn name_conflict_display_names_both_kinds() {
    let msg = MetricsError::NameConflict {
        name: "shop_api_work".into(),
        existing: MetricKind::Counter,
        requested: MetricKind::Gauge,
    }
    .to_string();
    assert!(msg.contains("shop_api_work"));
    assert!(msg.contains("counter"));
    assert!(msg.contains("gauge"));
}

#[test]
fn json_error_converts() {
    let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
    let err: MetricsError = parse.unwrap_err().into();
    assert!(err.to_string().starts_with("JSON error"));
}
