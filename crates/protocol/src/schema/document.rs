//! Indicator document container, layout and raw-form serialization.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use super::raw::{
    RawAlert, RawDocument, RawIndicator, RawLayout, RawPresentation, RawProduct, RawSection,
    RawThreshold,
};
use super::Indicator;
use crate::read::duration::format_duration;

/// Title of the section synthesized when a document has no layout.
pub const DEFAULT_SECTION_TITLE: &str = "Metrics";

/// A fully parsed and validated indicator document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub api_version: String,
    pub product: Product,
    pub metadata: BTreeMap<String, String>,
    pub indicators: Vec<Indicator>,
    pub layout: Layout,
}

/// Product identity used for patch matching.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Product {
    pub name: String,
    pub version: String,
}

impl Product {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Dashboard layout with indicator references resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub title: String,
    pub description: String,
    pub sections: Vec<Section>,
}

impl Layout {
    /// The layout used when a document declares none: a single `Metrics`
    /// section holding every indicator in document order.
    pub fn default_for(indicators: &[Indicator]) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            sections: vec![Section {
                title: DEFAULT_SECTION_TITLE.to_string(),
                description: String::new(),
                indicators: indicators.to_vec(),
            }],
        }
    }
}

/// A layout section. In raw form `indicators` is a list of names.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Section {
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "serialize_indicator_names")]
    pub indicators: Vec<Indicator>,
}

fn serialize_indicator_names<S: Serializer>(
    indicators: &[Indicator],
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.collect_seq(indicators.iter().map(|i| i.name.as_str()))
}

impl Document {
    /// Look up a top-level indicator by name.
    pub fn indicator(&self, name: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.name == name)
    }

    /// Convert back to the on-the-wire shape: thresholds as comparator
    /// fields, sections as indicator-name lists, durations as strings.
    pub(crate) fn to_raw(&self) -> RawDocument {
        RawDocument {
            api_version: self.api_version.clone(),
            product: RawProduct {
                name: self.product.name.clone(),
                version: self.product.version.clone(),
            },
            metadata: self.metadata.clone(),
            indicators: self.indicators.iter().map(indicator_to_raw).collect(),
            layout: Some(RawLayout {
                title: self.layout.title.clone(),
                description: self.layout.description.clone(),
                sections: self
                    .layout
                    .sections
                    .iter()
                    .map(|s| RawSection {
                        title: s.title.clone(),
                        description: s.description.clone(),
                        indicators: s.indicators.iter().map(|i| i.name.clone()).collect(),
                    })
                    .collect(),
            }),
        }
    }

    /// Serialize to YAML in the same shape [`crate::read_document`] accepts.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_raw())
    }

    /// Serialize to JSON, with sections listing indicator names.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

fn indicator_to_raw(indicator: &Indicator) -> RawIndicator {
    RawIndicator {
        name: indicator.name.clone(),
        promql: indicator.promql.clone(),
        alert: Some(RawAlert {
            for_: Some(indicator.alert.for_.clone()),
            step: Some(indicator.alert.step.clone()),
        }),
        thresholds: indicator
            .thresholds
            .iter()
            .map(|t| RawThreshold::from_operator(&t.level, t.operator, t.value))
            .collect(),
        presentation: Some(RawPresentation {
            current_value: Some(indicator.presentation.current_value),
            chart_type: Some(indicator.presentation.chart_type.to_string()),
            frequency: Some(serde_yaml::Value::String(format_duration(
                indicator.presentation.frequency,
            ))),
            labels: Some(indicator.presentation.labels.clone()),
        }),
        documentation: indicator.documentation.clone(),
    }
}
