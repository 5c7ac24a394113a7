//! Tests for the patch engine.

use super::*;
use crate::read::{read_document, read_patch, ReadOptions};
use crate::schema::{Document, Operator, Threshold};

const DOCUMENT: &str = r#"---
apiVersion: test-apiversion/document
product:
  name: testing
  version: 123
metadata:
  deployment: test-deployment
indicators:
- name: test_indicator
  promql: test_expr
  thresholds:
  - level: warning
    gt: 500
  - level: critical
    gt: 1000
"#;

const BARE_DOCUMENT: &str = r#"---
apiVersion: test-apiversion/document
product:
  name: testing
  version: 123
metadata:
  deployment: test-deployment
indicators:
- name: test_indicator
  promql: test_expr
"#;

fn patch(yaml: &str) -> Patch {
    read_patch(yaml.as_bytes()).unwrap()
}

fn patch_for_deployment(operations: &str) -> Patch {
    patch(&format!(
        "apiVersion: test-apiversion/patch\nmatch:\n  metadata:\n    deployment: test-deployment\noperations:\n{}",
        operations
    ))
}

fn apply_and_read(patches: &[Patch], doc: &str) -> Document {
    let bytes = apply_patches(patches, doc.as_bytes()).unwrap();
    read_document(&bytes, &ReadOptions::default()).unwrap()
}

// ── Path grammar ────────────────────────────────────────────────────

#[test]
fn parses_every_segment_kind() {
    let path = PatchPath::parse("/indicators/name=a/thresholds?/0/-").unwrap();
    assert_eq!(
        path.segments(),
        &[
            Segment::Key { name: "indicators".into(), optional: false },
            Segment::Attribute { key: "name".into(), value: "a".into() },
            Segment::Key { name: "thresholds".into(), optional: true },
            Segment::Index { index: 0, raw: "0".into() },
            Segment::Append,
        ]
    );
}

#[test]
fn unescapes_slash_and_tilde() {
    let path = PatchPath::parse("/metadata/a~1b~0c").unwrap();
    assert_eq!(
        path.segments()[1],
        Segment::Key { name: "a/b~c".into(), optional: false }
    );
}

#[test]
fn rejects_malformed_paths() {
    assert!(PatchPath::parse("indicators").is_err());
    assert!(PatchPath::parse("/").is_err());
    assert!(PatchPath::parse("/indicators//name").is_err());
    assert!(PatchPath::parse("/indicators/-/name").is_err());
}

// ── Matching ────────────────────────────────────────────────────────

#[test]
fn patches_documents_that_match() {
    let p = patch(
        r#"
apiVersion: test-apiversion/patch
match:
  product:
    name: testing
    version: 123
operations:
- type: replace
  path: /indicators/name=test_indicator/promql
  value: patched_promql
"#,
    );
    let doc = apply_and_read(&[p], BARE_DOCUMENT);
    assert_eq!(doc.indicators[0].promql, "patched_promql");
}

#[test]
fn skips_documents_that_do_not_match() {
    let p = patch(
        r#"
match:
  product:
    name: other-testing
    version: 123
operations:
- type: replace
  path: /indicators/name=test_indicator/promql
  value: patched_promql
"#,
    );
    let bytes = apply_patches(&[p], BARE_DOCUMENT.as_bytes()).unwrap();
    assert_eq!(bytes, BARE_DOCUMENT.as_bytes());
}

#[test]
fn earlier_patch_can_make_later_one_match() {
    let retag = patch_for_deployment(
        "- type: replace\n  path: /metadata/deployment\n  value: retagged\n",
    );
    let follow = patch(
        r#"
match:
  metadata:
    deployment: retagged
operations:
- type: replace
  path: /indicators/0/promql
  value: second
"#,
    );
    let doc = apply_and_read(&[retag, follow], BARE_DOCUMENT);
    assert_eq!(doc.metadata["deployment"], "retagged");
    assert_eq!(doc.indicators[0].promql, "second");
}

#[test]
fn patches_apply_in_order() {
    let first = patch_for_deployment("- type: replace\n  path: /indicators/0/promql\n  value: first\n");
    let second = patch_for_deployment("- type: replace\n  path: /indicators/0/promql\n  value: second\n");
    let doc = apply_and_read(&[first.clone(), second.clone()], BARE_DOCUMENT);
    assert_eq!(doc.indicators[0].promql, "second");
    let doc = apply_and_read(&[second, first], BARE_DOCUMENT);
    assert_eq!(doc.indicators[0].promql, "first");
}

// ── replace ─────────────────────────────────────────────────────────

#[test]
fn replaces_by_index() {
    let p = patch_for_deployment(
        "- type: replace\n  path: /indicators/0/thresholds/0\n  value:\n    level: warning\n    gt: \"1000\"\n",
    );
    let doc = apply_and_read(&[p], DOCUMENT);
    assert_eq!(
        doc.indicators[0].thresholds,
        vec![
            Threshold::new("warning", Operator::GreaterThan, 1000.0),
            Threshold::new("critical", Operator::GreaterThan, 1000.0),
        ]
    );
}

#[test]
fn replaces_by_attribute_value() {
    for value in ["800", "\"800\""] {
        let p = patch_for_deployment(&format!(
            "- type: replace\n  path: /indicators/name=test_indicator/thresholds/level=warning\n  value:\n    level: warning\n    gt: {value}\n"
        ));
        let doc = apply_and_read(&[p], DOCUMENT);
        assert_eq!(
            doc.indicators[0].thresholds,
            vec![
                Threshold::new("warning", Operator::GreaterThan, 800.0),
                Threshold::new("critical", Operator::GreaterThan, 1000.0),
            ],
            "gt: {value}"
        );
    }
}

#[test]
fn replace_through_optional_key_creates_sequence() {
    let p = patch_for_deployment(
        "- type: replace\n  path: /indicators/name=test_indicator/thresholds?/-\n  value:\n    level: warning\n    gt: \"10\"\n",
    );
    let doc = apply_and_read(&[p], BARE_DOCUMENT);
    assert_eq!(
        doc.indicators[0].thresholds,
        vec![Threshold::new("warning", Operator::GreaterThan, 10.0)]
    );
}

#[test]
fn optional_key_creates_mapping() {
    let p = patch_for_deployment(
        "- type: replace\n  path: /indicators/0/documentation?/title\n  value: Title\n",
    );
    let doc = apply_and_read(&[p], BARE_DOCUMENT);
    assert_eq!(doc.indicators[0].title(), "Title");
}

#[test]
fn replace_missing_parent_is_address_error() {
    let p = patch_for_deployment(
        "- type: replace\n  path: /indicators/0/documentation/title\n  value: Title\n",
    );
    let err = apply_patches(&[p], BARE_DOCUMENT.as_bytes()).unwrap_err();
    assert!(err.is_address(), "got {err}");
}

#[test]
fn replace_index_out_of_range_is_address_error() {
    let p = patch_for_deployment("- type: replace\n  path: /indicators/5\n  value: {}\n");
    let err = apply_patches(&[p], BARE_DOCUMENT.as_bytes()).unwrap_err();
    assert!(err.is_address());
}

#[test]
fn attribute_without_match_is_address_error() {
    let p = patch_for_deployment(
        "- type: replace\n  path: /indicators/name=missing/promql\n  value: x\n",
    );
    let err = apply_patches(&[p], BARE_DOCUMENT.as_bytes()).unwrap_err();
    assert!(err.is_address());
    assert!(err.to_string().contains("name=missing"));
}

// ── add ─────────────────────────────────────────────────────────────

#[test]
fn add_inserts_at_index() {
    let p = patch_for_deployment(
        "- type: add\n  path: /indicators/0/thresholds/0\n  value:\n    level: info\n    gt: 100\n",
    );
    let doc = apply_and_read(&[p], DOCUMENT);
    let levels: Vec<_> = doc.indicators[0].thresholds.iter().map(|t| t.level.as_str()).collect();
    assert_eq!(levels, ["info", "warning", "critical"]);
}

#[test]
fn add_at_length_appends() {
    let p = patch_for_deployment(
        "- type: add\n  path: /indicators/0/thresholds/2\n  value:\n    level: page\n    gt: 5000\n",
    );
    let doc = apply_and_read(&[p], DOCUMENT);
    assert_eq!(doc.indicators[0].thresholds[2].level, "page");
}

#[test]
fn add_creates_missing_intermediate_keys() {
    let p = patch_for_deployment(
        "- type: add\n  path: /indicators/0/alert/for\n  value: 10m\n",
    );
    let doc = apply_and_read(&[p], BARE_DOCUMENT);
    assert_eq!(doc.indicators[0].alert.for_, "10m");
    assert_eq!(doc.indicators[0].alert.step, "1m");
}

#[test]
fn add_appends_new_indicator() {
    let p = patch_for_deployment(
        "- type: add\n  path: /indicators/-\n  value:\n    name: second\n    promql: up\n",
    );
    let doc = apply_and_read(&[p], BARE_DOCUMENT);
    assert_eq!(doc.indicators.len(), 2);
    assert_eq!(doc.indicators[1].name, "second");
}

// ── remove ──────────────────────────────────────────────────────────

#[test]
fn removes_by_attribute() {
    let p = patch_for_deployment("- type: remove\n  path: /indicators/0/thresholds/level=warning\n");
    let doc = apply_and_read(&[p], DOCUMENT);
    assert_eq!(
        doc.indicators[0].thresholds,
        vec![Threshold::new("critical", Operator::GreaterThan, 1000.0)]
    );
}

#[test]
fn remove_by_attribute_removes_every_match() {
    let doc = r#"
product:
  name: testing
metadata:
  deployment: test-deployment
indicators:
- name: a
  promql: up
  thresholds:
  - level: warning
    gt: 1
  - level: critical
    gt: 2
  - level: warning
    gt: 3
"#;
    let p = patch_for_deployment("- type: remove\n  path: /indicators/0/thresholds/level=warning\n");
    let doc = apply_and_read(&[p], doc);
    assert_eq!(
        doc.indicators[0].thresholds,
        vec![Threshold::new("critical", Operator::GreaterThan, 2.0)]
    );
}

#[test]
fn removes_key_and_index() {
    let p = patch_for_deployment(
        "- type: remove\n  path: /indicators/0/thresholds/1\n- type: remove\n  path: /metadata/deployment\n",
    );
    let bytes = apply_patches(&[p], DOCUMENT.as_bytes()).unwrap();
    let doc = read_document(&bytes, &ReadOptions::default()).unwrap();
    assert!(doc.metadata.is_empty());
    assert_eq!(doc.indicators[0].thresholds.len(), 1);
}

#[test]
fn remove_missing_key_is_address_error() {
    let p = patch_for_deployment("- type: remove\n  path: /indicators/0/layout\n");
    assert!(apply_patches(&[p], BARE_DOCUMENT.as_bytes()).unwrap_err().is_address());
}

// ── test ────────────────────────────────────────────────────────────

#[test]
fn applies_operations_after_passing_test() {
    let p = patch_for_deployment(
        "- type: test\n  path: /indicators/0/name\n  value: test_indicator\n- type: remove\n  path: /indicators/0/thresholds/level=warning\n",
    );
    let doc = apply_and_read(&[p], DOCUMENT);
    assert_eq!(doc.indicators[0].thresholds.len(), 1);
}

#[test]
fn failing_test_abandons_rest_of_patch_only() {
    let guarded = patch_for_deployment(
        "- type: test\n  path: /indicators/0/name\n  value: not_test_indicator\n- type: remove\n  path: /indicators/0/thresholds/level=warning\n",
    );
    let next = patch_for_deployment("- type: replace\n  path: /indicators/0/promql\n  value: after\n");

    let doc = apply_and_read(&[guarded, next], DOCUMENT);
    assert_eq!(doc.indicators[0].thresholds.len(), 2);
    assert_eq!(doc.indicators[0].promql, "after");
}

#[test]
fn operations_before_failing_test_stay_applied() {
    let p = patch_for_deployment(
        "- type: replace\n  path: /indicators/0/promql\n  value: before\n- type: test\n  path: /indicators/0/name\n  value: nope\n- type: replace\n  path: /indicators/0/promql\n  value: after\n",
    );
    let mut tree: serde_yaml::Value = serde_yaml::from_str(BARE_DOCUMENT).unwrap();
    assert_eq!(apply_operations(&mut tree, &p).unwrap(), PatchOutcome::Aborted { at: 1 });
    assert_eq!(tree["indicators"][0]["promql"].as_str(), Some("before"));
}

#[test]
fn test_on_unresolvable_path_aborts_without_error() {
    let p = patch_for_deployment(
        "- type: test\n  path: /indicators/name=missing/name\n  value: x\n- type: replace\n  path: /indicators/0/promql\n  value: changed\n",
    );
    let doc = apply_and_read(&[p], BARE_DOCUMENT);
    assert_eq!(doc.indicators[0].promql, "test_expr");
}

#[test]
fn test_compares_structured_values() {
    let p = patch_for_deployment(
        "- type: test\n  path: /indicators/0/thresholds/0\n  value:\n    level: warning\n    gt: 500\n- type: replace\n  path: /indicators/0/promql\n  value: matched\n",
    );
    let doc = apply_and_read(&[p], DOCUMENT);
    assert_eq!(doc.indicators[0].promql, "matched");
}

#[test]
fn mapping_index_segment_is_plain_key() {
    let doc = r#"
product:
  name: testing
metadata:
  deployment: test-deployment
  "0": zero
indicators: []
"#;
    let p = patch_for_deployment("- type: replace\n  path: /metadata/0\n  value: replaced\n");
    let bytes = apply_patches(&[p], doc.as_bytes()).unwrap();
    let doc = read_document(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(doc.metadata["0"], "replaced");
}
