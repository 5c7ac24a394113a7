//! Raw shape → typed document: defaults, threshold resolution, layout.

use std::collections::HashSet;
use std::time::Duration;

use serde_yaml::Value;

use super::duration::parse_duration;
use crate::error::{ProtocolError, Result};
use crate::schema::raw::{scalar_text, RawDocument, RawIndicator, RawLayout, RawPresentation, RawThreshold};
use crate::schema::{
    Alert, ChartType, Document, Indicator, Layout, Presentation, Product, Section, Threshold,
};

pub(super) fn build_document(raw: RawDocument) -> Result<Document> {
    let indicators = raw
        .indicators
        .into_iter()
        .enumerate()
        .map(|(i, indicator)| build_indicator(i, indicator))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for (i, indicator) in indicators.iter().enumerate() {
        if !seen.insert(indicator.name.as_str()) {
            return Err(ProtocolError::validation(format!(
                "indicators[{}]: duplicate indicator name '{}'",
                i, indicator.name
            )));
        }
    }

    let layout = match raw.layout {
        Some(layout) => resolve_layout(layout, &indicators)?,
        None => Layout::default_for(&indicators),
    };

    Ok(Document {
        api_version: raw.api_version,
        product: Product::new(raw.product.name, raw.product.version),
        metadata: raw.metadata,
        indicators,
        layout,
    })
}

fn build_indicator(i: usize, raw: RawIndicator) -> Result<Indicator> {
    let alert = raw
        .alert
        .map(|a| {
            let defaults = Alert::default();
            Alert {
                for_: a.for_.filter(|s| !s.is_empty()).unwrap_or(defaults.for_),
                step: a.step.filter(|s| !s.is_empty()).unwrap_or(defaults.step),
            }
        })
        .unwrap_or_default();

    let thresholds = raw
        .thresholds
        .into_iter()
        .enumerate()
        .map(|(j, t)| {
            build_threshold(t)
                .map_err(|reason| ProtocolError::validation(format!("indicators[{}].thresholds[{}]: {}", i, j, reason)))
        })
        .collect::<Result<Vec<_>>>()?;

    let presentation = match raw.presentation {
        Some(p) => build_presentation(i, p)?,
        None => Presentation::default(),
    };

    Ok(Indicator {
        name: raw.name,
        promql: raw.promql,
        alert,
        thresholds,
        presentation,
        documentation: raw.documentation,
    })
}

fn build_threshold(raw: RawThreshold) -> std::result::Result<Threshold, String> {
    let level = raw.level.clone();
    let mut comparators = raw.comparators();
    if comparators.len() > 1 {
        let names: Vec<_> = comparators.iter().map(|(op, _)| op.abbrev()).collect();
        return Err(format!(
            "level '{}' has more than one comparator ({})",
            level,
            names.join(", ")
        ));
    }
    let (operator, value) = comparators
        .pop()
        .ok_or_else(|| format!("level '{}' has no comparator (lt, lte, eq, neq, gte, gt)", level))?;

    let value = numeric(&value).ok_or_else(|| {
        format!(
            "level '{}' value for {} is not a number: {}",
            level,
            operator.abbrev(),
            scalar_text(&value).unwrap_or_else(|| "<non-scalar>".to_string())
        )
    })?;
    Ok(Threshold::new(level, operator, value))
}

/// Finite `f64` from a YAML number or numeric string.
fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        Value::Tagged(tagged) => return numeric(&tagged.value),
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn build_presentation(i: usize, raw: RawPresentation) -> Result<Presentation> {
    let chart_type = match raw.chart_type.as_deref() {
        None | Some("") => ChartType::default(),
        Some(s) => s.parse().map_err(|e: String| {
            ProtocolError::validation(format!("indicators[{}].presentation.chartType: {}", i, e))
        })?,
    };

    let frequency = match raw.frequency {
        None | Some(Value::Null) => Duration::ZERO,
        Some(value) => frequency(&value).ok_or_else(|| {
            ProtocolError::validation(format!(
                "indicators[{}].presentation.frequency: invalid duration '{}'",
                i,
                scalar_text(&value).unwrap_or_default()
            ))
        })?,
    };

    Ok(Presentation {
        current_value: raw.current_value.unwrap_or(false),
        chart_type,
        frequency,
        labels: raw.labels.unwrap_or_default(),
    })
}

/// A bare number is seconds; a string is a duration expression.
fn frequency(value: &Value) -> Option<Duration> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64()?;
            Duration::try_from_secs_f64(secs).ok()
        }
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(secs) => Duration::try_from_secs_f64(secs).ok(),
            Err(_) => parse_duration(s),
        },
        Value::Tagged(tagged) => frequency(&tagged.value),
        _ => None,
    }
}

fn resolve_layout(raw: RawLayout, indicators: &[Indicator]) -> Result<Layout> {
    let sections = raw
        .sections
        .into_iter()
        .enumerate()
        .map(|(i, section)| {
            let resolved = section
                .indicators
                .iter()
                .enumerate()
                .map(|(j, name)| {
                    indicators
                        .iter()
                        .find(|ind| &ind.name == name)
                        .cloned()
                        .ok_or_else(|| {
                            ProtocolError::validation(format!(
                                "documentation.sections[{}].indicators[{}] references non-existent indicator '{}'",
                                i, j, name
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Section {
                title: section.title,
                description: section.description,
                indicators: resolved,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Layout {
        title: raw.title,
        description: raw.description,
        sections,
    })
}
