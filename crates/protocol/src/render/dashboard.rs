//! Grafana dashboard JSON and artifact naming.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::Renderer;
use crate::error::Result;
use crate::schema::{Document, Indicator, Operator, Threshold};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub title: String,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub targets: Vec<Target>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub thresholds: Vec<DashboardThreshold>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub expr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardThreshold {
    pub value: f64,
    pub color_mode: String,
    pub op: String,
    pub fill: bool,
    pub line: bool,
    pub yaxis: String,
}

/// Renders one dashboard per document: a row per layout section and a
/// graph panel per indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardRenderer;

impl Renderer for DashboardRenderer {
    type Output = Dashboard;

    fn render(&self, document: &Document) -> Result<Dashboard> {
        Ok(Dashboard::from_document(document))
    }
}

impl Dashboard {
    pub fn from_document(document: &Document) -> Self {
        let title = if document.layout.title.is_empty() {
            format!("{} - {}", document.product.name, document.product.version)
        } else {
            document.layout.title.clone()
        };

        let rows = document
            .layout
            .sections
            .iter()
            .map(|section| Row {
                title: section.title.clone(),
                panels: section.indicators.iter().map(panel).collect(),
            })
            .collect();

        Self { title, rows }
    }
}

fn panel(indicator: &Indicator) -> Panel {
    Panel {
        title: indicator.title().to_string(),
        kind: "graph".to_string(),
        targets: vec![Target {
            expr: indicator.promql.replace("$step", "$__interval"),
        }],
        thresholds: indicator
            .thresholds
            .iter()
            .filter_map(|t| dashboard_threshold(&indicator.name, t))
            .collect(),
    }
}

fn dashboard_threshold(indicator: &str, threshold: &Threshold) -> Option<DashboardThreshold> {
    let op = if threshold.operator <= Operator::LessThanOrEqualTo {
        "lt"
    } else if threshold.operator >= Operator::GreaterThanOrEqualTo {
        "gt"
    } else {
        warn!(
            indicator,
            level = %threshold.level,
            operator = threshold.operator.abbrev(),
            value = threshold.value,
            "dashboards only support lt/gt thresholds, threshold skipped"
        );
        return None;
    };

    Some(DashboardThreshold {
        value: threshold.value,
        color_mode: threshold.level.clone(),
        op: op.to_string(),
        fill: true,
        line: true,
        yaxis: "left".to_string(),
    })
}

/// `<product>_<sha256 of the document's JSON>.json`; stable for equal
/// documents and different when any field changes.
pub fn dashboard_filename(document: &Document) -> Result<String> {
    let json = serde_json::to_vec(document)?;
    let digest = Sha256::digest(&json);
    Ok(format!("{}_{digest:x}.json", document.product.name))
}

/// Stable object name for a resource: `<resource>-<9 hex chars>`.
pub fn artifact_name(resource: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(resource.as_bytes()));
    format!("{}-{}", resource, &digest[..9])
}
