//! Renderers turn validated documents into downstream artifacts.

mod alerts;
mod dashboard;
mod docs;

pub use alerts::{alert_group, AlertGroup, AlertRule, AlertRuleDocument, AlertRuleRenderer};
pub use dashboard::{
    artifact_name, dashboard_filename, Dashboard, DashboardRenderer, DashboardThreshold, Panel,
    Row, Target,
};
pub use docs::{indicator_html, DocsRenderer};

use crate::error::Result;
use crate::schema::Document;

/// Produces one output per document.
pub trait Renderer {
    type Output;

    fn render(&self, document: &Document) -> Result<Self::Output>;
}

impl<F, T> Renderer for F
where
    F: Fn(&Document) -> Result<T>,
{
    type Output = T;

    fn render(&self, document: &Document) -> Result<T> {
        self(document)
    }
}
