//! Dashboard JSON model.
//!
//! Only the fields provisioning reads or writes are typed. Everything else
//! the dashboard service returns is kept in the flattened `extra`/`options`
//! maps so a fetched board is written back without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Panel width in grid units (full row).
pub const PANEL_WIDTH: u32 = 24;

/// Panel height in grid units.
pub const PANEL_HEIGHT: u32 = 7;

/// A dashboard as stored by the dashboard service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeRange>,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Board {
    /// An empty, editable board showing the last 24 hours.
    pub fn scaffold(title: impl Into<String>, uid: impl Into<String>) -> Self {
        let uid = uid.into();
        let mut extra = Map::new();
        extra.insert("editable".to_string(), Value::Bool(true));
        extra.insert("annotations".to_string(), serde_json::json!({ "list": [] }));
        Self {
            id: None,
            title: title.into(),
            slug: Some(uid.clone()),
            uid,
            version: None,
            time: Some(TimeRange::last_24h()),
            panels: Vec::new(),
            extra,
        }
    }

    /// Whether any panel queries the given metric.
    pub fn queries_metric(&self, full_metric_name: &str) -> bool {
        self.panels
            .iter()
            .flat_map(|panel| panel.targets.iter())
            .any(|target| target.expr.contains(full_metric_name))
    }
}

/// Dashboard time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn last_24h() -> Self {
        Self {
            from: "now-24h".to_string(),
            to: "now".to_string(),
        }
    }
}

/// A dashboard panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    #[serde(default)]
    pub id: u64,
    #[serde(default, rename = "type")]
    pub panel_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub grid_pos: GridPos,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// Panel placement on the 24-column dashboard grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    #[serde(default)]
    pub h: u32,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
}

/// One query of a panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default)]
    pub expr: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query expression and axis unit for a generated graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQuery {
    pub expr: String,
    pub y_axis_unit: &'static str,
    pub legend_format: Option<String>,
}

impl GraphQuery {
    /// Hourly increase of a counter: `sum(increase(<selector>[1h]))`.
    pub fn counter(selector: &str) -> Self {
        Self {
            expr: format!("sum(increase({selector}[1h]))"),
            y_axis_unit: "short",
            legend_format: None,
        }
    }

    /// Worst value per quantile of a nanosecond timer summary.
    pub fn timer(selector: &str) -> Self {
        Self {
            expr: format!("max by(quantile)({selector})"),
            y_axis_unit: "ns",
            legend_format: Some("for {{quantile}}pp".to_string()),
        }
    }
}

/// Cosmetic settings of generated graph panels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphStyle {
    yaxes: [Axis; 2],
    xaxis: Axis,
    fill: u32,
    linewidth: u32,
    renderer: &'static str,
    dash_length: u32,
    dashes: bool,
    space_length: u32,
    bars: bool,
    lines: bool,
    null_point_mode: &'static str,
    tooltip: Tooltip,
    legend: Legend,
    alias_colors: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Axis {
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'static str>,
    show: bool,
    log_base: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Tooltip {
    shared: bool,
    sort: u32,
    value_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct Legend {
    show: bool,
    values: bool,
    min: bool,
    max: bool,
    avg: bool,
}

impl GraphStyle {
    fn with_unit(unit: &'static str) -> Self {
        Self {
            yaxes: [
                Axis {
                    format: unit,
                    min: Some(0.0),
                    mode: None,
                    show: true,
                    log_base: 1,
                },
                Axis {
                    format: "short",
                    min: None,
                    mode: None,
                    show: true,
                    log_base: 1,
                },
            ],
            xaxis: Axis {
                format: "time",
                min: None,
                mode: Some("time"),
                show: true,
                log_base: 1,
            },
            fill: 1,
            linewidth: 1,
            renderer: "flot",
            dash_length: 10,
            dashes: false,
            space_length: 10,
            bars: true,
            lines: false,
            // gaps stay gaps, never zero-filled
            null_point_mode: "null",
            tooltip: Tooltip {
                shared: true,
                sort: 0,
                value_type: "individual",
            },
            legend: Legend {
                show: true,
                values: true,
                min: true,
                max: true,
                avg: true,
            },
            alias_colors: Map::new(),
        }
    }
}

/// Build a full-width graph panel.
pub fn graph_panel(
    id: u64,
    title: &str,
    grid_pos: GridPos,
    query: &GraphQuery,
    datasource: Option<&str>,
) -> crate::Result<Panel> {
    let options = match serde_json::to_value(GraphStyle::with_unit(query.y_axis_unit))? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Ok(Panel {
        id,
        panel_type: "graph".to_string(),
        title: title.to_string(),
        grid_pos,
        datasource: datasource.map(|ds| Value::String(ds.to_string())),
        targets: vec![Target {
            expr: query.expr.clone(),
            ref_id: "A".to_string(),
            legend_format: query.legend_format.clone(),
            interval: Some(String::new()),
            extra: Map::new(),
        }],
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetched_board_keeps_unknown_fields() {
        let json = r#"{
            "id": 12,
            "uid": "abc",
            "title": "Shop",
            "version": 3,
            "schemaVersion": 27,
            "panels": [
                {"id": 2, "type": "stat", "gridPos": {"h": 4, "w": 6, "x": 0, "y": 0},
                 "targets": [{"expr": "up", "refId": "A", "hide": false}],
                 "fieldConfig": {"defaults": {}}}
            ]
        }"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.version, Some(3));
        assert_eq!(board.panels[0].grid_pos.h, 4);

        let back = serde_json::to_value(&board).unwrap();
        assert_eq!(back["schemaVersion"], 27);
        assert_eq!(back["panels"][0]["fieldConfig"], serde_json::json!({"defaults": {}}));
        assert_eq!(back["panels"][0]["targets"][0]["hide"], false);
        assert_eq!(back["panels"][0]["type"], "stat");
    }

    #[test]
    fn panels_without_grid_pos_or_targets_parse() {
        let json = r#"{"uid": "u", "title": "t", "panels": [{"id": 1, "type": "row"}]}"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.panels[0].grid_pos, GridPos::default());
        assert!(board.panels[0].targets.is_empty());
    }

    #[test]
    fn scaffold_uses_uid_as_slug_and_24h_window() {
        let board = Board::scaffold("Shop", "deadbeef");
        assert_eq!(board.slug.as_deref(), Some("deadbeef"));
        assert_eq!(board.uid, "deadbeef");
        assert_eq!(board.time, Some(TimeRange::last_24h()));
        assert!(board.panels.is_empty());
        assert!(board.id.is_none());
    }

    #[test]
    fn queries_metric_matches_substring_of_expression() {
        let mut board = Board::scaffold("Shop", "u");
        board.panels.push(Panel {
            targets: vec![Target {
                expr: "sum(increase(shop_api_orders_total{status=\"ok\"}[1h]))".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert!(board.queries_metric("shop_api_orders_total"));
        assert!(!board.queries_metric("shop_api_refunds_total"));
    }

    #[test]
    fn counter_and_timer_queries() {
        let counter = GraphQuery::counter("ns_sub_orders");
        assert_eq!(counter.expr, "sum(increase(ns_sub_orders[1h]))");
        assert_eq!(counter.y_axis_unit, "short");

        let timer = GraphQuery::timer("ns_sub_req_time");
        assert_eq!(timer.expr, "max by(quantile)(ns_sub_req_time)");
        assert_eq!(timer.y_axis_unit, "ns");
    }

    #[test]
    fn graph_panel_carries_cosmetic_defaults() {
        let pos = GridPos {
            h: PANEL_HEIGHT,
            w: PANEL_WIDTH,
            x: 0,
            y: 7,
        };
        let panel = graph_panel(4, "Orders", pos, &GraphQuery::timer("m"), Some("prom")).unwrap();
        let json = serde_json::to_value(&panel).unwrap();

        assert_eq!(json["id"], 4);
        assert_eq!(json["type"], "graph");
        assert_eq!(json["gridPos"], serde_json::json!({"h": 7, "w": 24, "x": 0, "y": 7}));
        assert_eq!(json["datasource"], "prom");
        assert_eq!(json["targets"][0]["expr"], "max by(quantile)(m)");
        assert_eq!(json["yaxes"][0]["format"], "ns");
        assert_eq!(json["tooltip"]["shared"], true);
        assert_eq!(json["legend"]["min"], true);
        assert_eq!(json["legend"]["max"], true);
        assert_eq!(json["legend"]["avg"], true);
        assert_eq!(json["bars"], true);
        assert_eq!(json["nullPointMode"], "null");
    }
}
