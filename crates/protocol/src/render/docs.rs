//! HTML documentation pages.
//!
//! Each indicator becomes a table of its description, query, thresholds and
//! remaining documentation fields. Documentation values are markdown; every
//! other value is HTML-escaped by the template environment.

use std::collections::BTreeMap;

use minijinja::Environment;
use serde::Serialize;

use super::Renderer;
use crate::error::{ProtocolError, Result};
use crate::schema::{Document, Indicator, Threshold};

/// Documentation keys with a dedicated place in the indicator table.
const PRESENTED_FIELDS: [&str; 3] = ["title", "description", "thresholdNote"];

const INDICATOR_TEMPLATE: &str = r#"<table>
    <tr>
        <th width="25%">Description</th>
        <td>{{ indicator.description|safe }}</td>
    </tr>
    <tr>
        <th>PromQL</th>
        <td><code>{{ indicator.promql }}</code></td>
    </tr>
    {%- if indicator.thresholds %}
    <tr>
        <th>Thresholds</th>
        <td>
            {%- for t in indicator.thresholds %}
            <em>{{ t.level }}</em>: {{ t.operator }} {{ t.value }}<br/>
            {%- endfor %}
            {{ indicator.threshold_note|safe }}
        </td>
    </tr>
    {%- endif %}
    {%- for title, html in indicator.other_fields|items %}
    <tr>
        <th>{{ title }}</th>
        <td>{{ html|safe }}</td>
    </tr>
    {%- endfor %}
</table>
"#;

const DOCUMENT_TEMPLATE: &str = r#"<h1>{{ title }}</h1>
{%- if description %}
<p>{{ description }}</p>
{%- endif %}
{%- for section in sections %}
<h2>{{ section.title }}</h2>
{%- if section.description %}
<p>{{ section.description }}</p>
{%- endif %}
{%- for indicator in section.indicators %}
<h3 id="{{ indicator.name }}">{{ indicator.title }}</h3>
{% include "indicator.html" %}
{%- endfor %}
{%- endfor %}
"#;

// ── Presenters ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ThresholdView {
    level: String,
    operator: &'static str,
    value: String,
}

impl From<&Threshold> for ThresholdView {
    fn from(threshold: &Threshold) -> Self {
        Self {
            level: level_label(&threshold.level),
            operator: threshold.operator.symbol(),
            value: threshold.value.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct IndicatorView {
    name: String,
    title: String,
    description: String,
    promql: String,
    thresholds: Vec<ThresholdView>,
    threshold_note: String,
    other_fields: BTreeMap<String, String>,
}

impl From<&Indicator> for IndicatorView {
    fn from(indicator: &Indicator) -> Self {
        let markdown_field = |key: &str| {
            indicator
                .documentation
                .get(key)
                .map(|text| markdown(text))
                .unwrap_or_default()
        };

        let other_fields = indicator
            .documentation
            .iter()
            .filter(|(key, _)| !PRESENTED_FIELDS.contains(&key.as_str()))
            .map(|(key, text)| (field_title(key), markdown(text)))
            .collect();

        Self {
            name: indicator.name.clone(),
            title: indicator.title().to_string(),
            description: markdown_field("description"),
            promql: indicator.promql.clone(),
            thresholds: indicator.thresholds.iter().map(ThresholdView::from).collect(),
            threshold_note: markdown_field("thresholdNote"),
            other_fields,
        }
    }
}

#[derive(Debug, Serialize)]
struct SectionView {
    title: String,
    description: String,
    indicators: Vec<IndicatorView>,
}

#[derive(Debug, Serialize)]
struct DocumentView {
    title: String,
    description: String,
    sections: Vec<SectionView>,
}

/// Threshold levels with a color cue for the two conventional levels.
fn level_label(level: &str) -> String {
    match level {
        "warning" => "Yellow warning".to_string(),
        "critical" => "Red critical".to_string(),
        other => other.to_string(),
    }
}

/// `recommendedResponse` becomes `Recommended Response`.
fn field_title(key: &str) -> String {
    let mut title = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            title.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            title.push(' ');
            title.push(c);
        } else {
            title.push(c);
        }
    }
    title
}

fn markdown(text: &str) -> String {
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new(text));
    html
}

// ── Rendering ───────────────────────────────────────────────────────

fn build_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("indicator.html", INDICATOR_TEMPLATE)
        .map_err(template_error)?;
    env.add_template("document.html", DOCUMENT_TEMPLATE)
        .map_err(template_error)?;
    Ok(env)
}

fn template_error(e: minijinja::Error) -> ProtocolError {
    ProtocolError::Template(e.to_string())
}

/// Render the documentation table for a single indicator.
pub fn indicator_html(indicator: &Indicator) -> Result<String> {
    let env = build_env()?;
    env.get_template("indicator.html")
        .and_then(|t| t.render(minijinja::context! { indicator => IndicatorView::from(indicator) }))
        .map_err(template_error)
}

/// Renders a whole document as an HTML fragment, one table per indicator,
/// grouped by layout section.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocsRenderer;

impl Renderer for DocsRenderer {
    type Output = String;

    fn render(&self, document: &Document) -> Result<String> {
        let title = if document.layout.title.is_empty() {
            format!("{} - {}", document.product.name, document.product.version)
        } else {
            document.layout.title.clone()
        };
        let view = DocumentView {
            title,
            description: document.layout.description.clone(),
            sections: document
                .layout
                .sections
                .iter()
                .map(|section| SectionView {
                    title: section.title.clone(),
                    description: section.description.clone(),
                    indicators: section.indicators.iter().map(IndicatorView::from).collect(),
                })
                .collect(),
        };

        let env = build_env()?;
        env.get_template("document.html")
            .and_then(|t| t.render(&view))
            .map_err(template_error)
    }
}
