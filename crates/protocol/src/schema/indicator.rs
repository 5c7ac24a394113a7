//! Indicator definitions: query, alert timing, thresholds and presentation hints.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::Threshold;
use crate::read::duration::format_duration;

pub(crate) const DEFAULT_ALERT_FOR: &str = "1m";
pub(crate) const DEFAULT_ALERT_STEP: &str = "1m";

/// A named PromQL-backed metric with thresholds and documentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub name: String,
    pub promql: String,
    pub alert: Alert,
    pub thresholds: Vec<Threshold>,
    pub presentation: Presentation,
    pub documentation: BTreeMap<String, String>,
}

impl Indicator {
    /// Display title: `documentation.title` when present, otherwise the name.
    pub fn title(&self) -> &str {
        self.documentation
            .get("title")
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

/// Alert timing. Both fields default to `"1m"` independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    #[serde(rename = "for")]
    pub for_: String,
    pub step: String,
}

impl Default for Alert {
    fn default() -> Self {
        Self {
            for_: DEFAULT_ALERT_FOR.to_string(),
            step: DEFAULT_ALERT_STEP.to_string(),
        }
    }
}

/// Dashboard presentation hints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub current_value: bool,
    pub chart_type: ChartType,
    #[serde(serialize_with = "serialize_duration")]
    pub frequency: Duration,
    pub labels: Vec<String>,
}

fn serialize_duration<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format_duration(*d))
}

/// Supported chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Step,
    Bar,
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Step => "step",
            ChartType::Bar => "bar",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "step" => Ok(ChartType::Step),
            "bar" => Ok(ChartType::Bar),
            other => Err(format!("'{}' - valid chart types are step, bar", other)),
        }
    }
}
