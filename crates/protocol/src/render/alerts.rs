//! Prometheus alerting rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Renderer;
use crate::error::Result;
use crate::schema::{Document, Indicator, Threshold};

/// A Prometheus rule file: `groups: [...]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertRuleDocument {
    pub groups: Vec<AlertGroup>,
}

impl AlertRuleDocument {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertGroup {
    pub name: String,
    pub rules: Vec<AlertRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub alert: String,
    pub expr: String,
    #[serde(rename = "for")]
    pub for_: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// Renders one alert group per document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertRuleRenderer;

impl Renderer for AlertRuleRenderer {
    type Output = AlertGroup;

    fn render(&self, document: &Document) -> Result<AlertGroup> {
        Ok(alert_group(document))
    }
}

/// One rule per threshold, grouped under the product name.
pub fn alert_group(document: &Document) -> AlertGroup {
    let rules = document
        .indicators
        .iter()
        .flat_map(|indicator| {
            indicator
                .thresholds
                .iter()
                .map(move |threshold| alert_rule(document, indicator, threshold))
        })
        .collect();

    AlertGroup {
        name: document.product.name.clone(),
        rules,
    }
}

fn alert_rule(document: &Document, indicator: &Indicator, threshold: &Threshold) -> AlertRule {
    let mut labels = document.metadata.clone();
    labels.insert("product".to_string(), document.product.name.clone());
    labels.insert("version".to_string(), document.product.version.clone());
    labels.insert("level".to_string(), threshold.level.clone());

    AlertRule {
        alert: indicator.name.clone(),
        expr: format!(
            "{} {} {}",
            indicator.promql.replace("$step", &indicator.alert.step),
            threshold.operator.symbol(),
            threshold.value
        ),
        for_: indicator.alert.for_.clone(),
        labels,
        annotations: indicator.documentation.clone(),
    }
}
