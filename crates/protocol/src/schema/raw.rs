//! On-the-wire YAML shapes, decoded before defaults and validation run.
//!
//! Every field is lenient: missing fields default, unknown fields are
//! ignored, and scalar identity values (`version: 123`) are read as strings.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use super::{Operator, OperationKind};

// ── Documents ───────────────────────────────────────────────────────

/// Lightweight first-pass shape: only the fields that identify a document.
///
/// Used for patch matching and for metadata interpolation, neither of which
/// requires the rest of the document to be valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawEnvelope {
    #[serde(default)]
    pub product: RawProduct,
    #[serde(default, deserialize_with = "scalar_map")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    #[serde(default, deserialize_with = "scalar_string")]
    pub api_version: String,
    #[serde(default)]
    pub product: RawProduct,
    #[serde(default, deserialize_with = "scalar_map")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub indicators: Vec<RawIndicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<RawLayout>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawProduct {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawIndicator {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub promql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<RawAlert>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thresholds: Vec<RawThreshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<RawPresentation>,
    #[serde(default, deserialize_with = "scalar_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub documentation: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawAlert {
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub for_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

/// A threshold before comparator resolution; values stay untyped so a
/// non-numeric value surfaces as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawThreshold {
    #[serde(default, deserialize_with = "scalar_string")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
}

impl RawThreshold {
    pub fn from_operator(level: &str, operator: Operator, value: f64) -> Self {
        let mut raw = RawThreshold {
            level: level.to_string(),
            ..Default::default()
        };
        let value = Some(Value::Number(value.into()));
        match operator {
            Operator::LessThan => raw.lt = value,
            Operator::LessThanOrEqualTo => raw.lte = value,
            Operator::EqualTo => raw.eq = value,
            Operator::NotEqualTo => raw.neq = value,
            Operator::GreaterThanOrEqualTo => raw.gte = value,
            Operator::GreaterThan => raw.gt = value,
        }
        raw
    }

    /// Comparator fields that are present, in `Operator::ALL` order.
    pub fn comparators(self) -> Vec<(Operator, Value)> {
        [self.lt, self.lte, self.eq, self.neq, self.gte, self.gt]
            .into_iter()
            .zip(Operator::ALL)
            .filter_map(|(value, op)| value.map(|v| (op, v)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawLayout {
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<RawSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawSection {
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(default)]
    pub indicators: Vec<String>,
}

// ── Patches ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawPatch {
    #[serde(rename = "apiVersion", default, deserialize_with = "scalar_string")]
    pub api_version: String,
    #[serde(rename = "match", default)]
    pub matcher: RawMatch,
    #[serde(default)]
    pub operations: Vec<RawOperation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawMatch {
    #[serde(default)]
    pub product: RawMatchProduct,
    #[serde(default, deserialize_with = "scalar_map")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawMatchProduct {
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawOperation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub path: String,
    #[serde(default)]
    pub value: Option<Value>,
}

// ── Scalar helpers ──────────────────────────────────────────────────

/// Text form of a scalar YAML value; `None` for sequences and mappings.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    scalar_text(&value).ok_or_else(|| D::Error::custom("expected a scalar value"))
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        value => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected a scalar value")),
    }
}

fn scalar_map<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let value = Value::deserialize(d)?;
    let mapping = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(m) => m,
        _ => return Err(D::Error::custom("expected a mapping of scalar values")),
    };
    mapping
        .iter()
        .map(|(k, v)| match (scalar_text(k), scalar_text(v)) {
            (Some(k), Some(v)) => Ok((k, v)),
            _ => Err(D::Error::custom("expected a mapping of scalar values")),
        })
        .collect()
}
