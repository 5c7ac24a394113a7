//! End-to-end tests over the fixture sources in `tests/fixtures/`:
//! load, patch, validate and render through the public API.

use std::path::PathBuf;

use indicator_protocol::loader::SourceLoader;
use indicator_protocol::render::{AlertRuleDocument, DashboardRenderer, DocsRenderer, Renderer};
use indicator_protocol::schema::{Operator, Threshold};
use indicator_protocol::{
    apply_patches, match_document, read_document, read_patch, AggregationStore, DocumentKey,
    Match, ReadOptions,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn loaded_store() -> AggregationStore {
    let dir = fixtures_dir();
    let store = AggregationStore::new();
    let results = SourceLoader::new(dir.join("documents"), Some(dir.join("patches"))).load_all(&store);
    for result in &results {
        assert!(result.is_loaded(), "fixture failed to load: {:?}", result);
    }
    store
}

fn gorouter() -> DocumentKey {
    DocumentKey::new("platform", "gorouter")
}

#[test]
fn fixtures_load_and_validate() {
    let store = loaded_store();
    assert_eq!(store.len(), 2);
    assert_eq!(store.patches().len(), 2);
    assert_eq!(
        store.keys(),
        vec![DocumentKey::new("platform", "doppler"), gorouter()]
    );
}

#[test]
fn metadata_is_interpolated_but_step_is_kept() {
    let store = loaded_store();
    let doc = store.document(&gorouter()).unwrap().unwrap();
    assert_eq!(
        doc.indicators[0].promql,
        r#"histogram_quantile(0.99, rate(gorouter_latency_ms_bucket{source_id="gorouter",deployment="cf-abc"}[$step]))"#
    );
}

#[test]
fn patches_apply_in_file_order() {
    let store = loaded_store();
    let doc = store.document(&gorouter()).unwrap().unwrap();
    let latency = doc.indicator("request_latency").unwrap();

    assert_eq!(
        latency.thresholds,
        vec![
            Threshold::new("warning", Operator::GreaterThanOrEqualTo, 100.0),
            Threshold::new("critical", Operator::GreaterThanOrEqualTo, 750.0),
            Threshold::new("info", Operator::LessThan, 1.0),
        ]
    );
    assert_eq!(
        latency.documentation["runbook"],
        "https://runbooks.example.com/cf-abc"
    );

    // Layout sections hold the patched indicator, not the pre-patch copy.
    assert_eq!(doc.layout.sections[0].indicators[0], *latency);
}

#[test]
fn metadata_patch_creates_missing_containers() {
    let store = loaded_store();
    let doc = store
        .document(&DocumentKey::new("platform", "doppler"))
        .unwrap()
        .unwrap();
    let indicator = &doc.indicators[0];
    assert_eq!(indicator.documentation.len(), 1);
    assert_eq!(indicator.thresholds.len(), 2);
}

#[test]
fn alert_rules_cover_every_threshold() {
    let store = loaded_store();
    let rules: AlertRuleDocument = serde_yaml::from_str(&store.alert_rules()).unwrap();

    let names: Vec<_> = rules.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["platform/doppler", "platform/gorouter"]);
    assert_eq!(rules.groups[0].rules.len(), 2);
    assert_eq!(rules.groups[1].rules.len(), 5);

    let critical = &rules.groups[1].rules[1];
    assert_eq!(critical.alert, "request_latency");
    assert_eq!(critical.for_, "5m");
    assert!(critical.expr.contains("[10m]"));
    assert!(critical.expr.ends_with(">= 750"));
    assert_eq!(critical.labels["level"], "critical");
    assert_eq!(critical.labels["source_id"], "gorouter");
    assert_eq!(critical.annotations["title"], "Request Latency");
}

#[test]
fn dashboards_follow_layout() {
    let store = loaded_store();
    let dashboards = store.dashboards();
    assert_eq!(dashboards.len(), 2);

    let router = dashboards.iter().find(|d| d.key == gorouter()).unwrap();
    assert!(router.filename.starts_with("gorouter_"));
    assert_eq!(router.dashboard.title, "Router Health");

    let rows: Vec<_> = router.dashboard.rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(rows, ["Latency", "Errors"]);

    let latency = &router.dashboard.rows[0].panels[0];
    assert!(latency.targets[0].expr.contains("[$__interval]"));
    assert_eq!(latency.thresholds.len(), 3);

    // eq thresholds have no dashboard equivalent.
    let total_routes = &router.dashboard.rows[1].panels[1];
    assert_eq!(total_routes.title, "total_routes");
    assert!(total_routes.thresholds.is_empty());
}

#[test]
fn raw_pipeline_matches_store_pipeline() {
    let dir = fixtures_dir();
    let raw = std::fs::read(dir.join("documents/platform/gorouter.yml")).unwrap();
    let patches = ["10-router-latency.yml", "20-deployment-runbook.yml"]
        .iter()
        .map(|f| read_patch(&std::fs::read(dir.join("patches").join(f)).unwrap()).unwrap())
        .collect::<Vec<_>>();

    assert!(match_document(&patches[0].matcher, &raw));
    assert!(match_document(&Match::metadata([("deployment", "cf-abc")]), &raw));

    let patched = apply_patches(&patches, &raw).unwrap();
    let doc = read_document(&patched, &ReadOptions::default()).unwrap();

    let store = loaded_store();
    assert_eq!(doc, store.document(&gorouter()).unwrap().unwrap());
    assert_eq!(
        DashboardRenderer.render(&doc).unwrap(),
        store.dashboards().into_iter().find(|d| d.key == gorouter()).unwrap().dashboard
    );
}

#[test]
fn registration_key_is_stable_across_reformatting() {
    let dir = fixtures_dir();
    let raw = std::fs::read(dir.join("documents/platform/doppler.yml")).unwrap();
    let doc = read_document(&raw, &ReadOptions::default()).unwrap();
    let reread = read_document(doc.to_yaml().unwrap().as_bytes(), &ReadOptions::default()).unwrap();

    assert_eq!(doc, reread);
    assert_eq!(DocumentKey::for_document(&doc), DocumentKey::for_document(&reread));
    assert_eq!(DocumentKey::for_document(&doc).namespace, "doppler");
}

#[test]
fn documentation_pages_show_patched_values() {
    let store = loaded_store();
    let pages = store.render_with(&DocsRenderer);
    assert_eq!(pages.len(), 2);

    let (_, router) = pages.iter().find(|(key, _)| *key == gorouter()).unwrap();
    assert!(router.starts_with("<h1>Router Health</h1>"));
    assert!(router.contains("<em>Red critical</em>: &gt;= 750<br/>"));
    assert!(router.contains("<th>Recommended Response</th>"));
    assert!(router.contains("<th>Runbook</th>"));
    assert!(router.contains(r#"<h3 id="total_routes">total_routes</h3>"#));
}
