//! Patch selection against raw document identity.

use std::collections::BTreeMap;

use tracing::debug;

use crate::schema::raw::RawEnvelope;
use crate::schema::{Match, Product};

impl Match {
    /// Evaluate against a product identity and metadata map.
    pub fn matches(&self, product: &Product, metadata: &BTreeMap<String, String>) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.name.as_ref().is_some_and(|name| *name != product.name) {
            return false;
        }
        if self.version.as_ref().is_some_and(|version| *version != product.version) {
            return false;
        }
        self.metadata
            .iter()
            .all(|(k, v)| metadata.get(k) == Some(v))
    }
}

/// Decode only `product` and `metadata` from `document` and evaluate the
/// match. Undecodable input never matches.
pub fn match_document(matcher: &Match, document: &[u8]) -> bool {
    let envelope: RawEnvelope = match serde_yaml::from_slice(document) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, "cannot decode document identity for matching");
            return false;
        }
    };
    let product = Product::new(envelope.product.name, envelope.product.version);
    matcher.matches(&product, &envelope.metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(name: &str, version: &str, deployment: &str) -> Vec<u8> {
        format!(
            "---\napiVersion: test-apiversion/document\n\nproduct:\n  name: {name}\n  version: {version}\n\nmetadata:\n  deployment: {deployment}\n\nindicators:\n- name: test_indicator\n  promql: test_expr\n"
        )
        .into_bytes()
    }

    fn matchers() -> [Match; 3] {
        [
            Match::product("testing", "123"),
            Match::metadata([("deployment", "test-deployment")]),
            Match::product("other-testing", "456").with_metadata("deployment", "other-test-deployment"),
        ]
    }

    #[test]
    fn matches_name_and_version() {
        let doc = document("testing", "123", "non-matching-test-deployment");
        let [m1, m2, m3] = matchers();
        assert!(match_document(&m1, &doc));
        assert!(!match_document(&m2, &doc));
        assert!(!match_document(&m3, &doc));
    }

    #[test]
    fn matches_metadata() {
        let doc = document("testing-foo-foo", "123456", "test-deployment");
        let [m1, m2, m3] = matchers();
        assert!(!match_document(&m1, &doc));
        assert!(match_document(&m2, &doc));
        assert!(!match_document(&m3, &doc));
    }

    #[test]
    fn matches_name_version_and_metadata() {
        let doc = document("other-testing", "456", "other-test-deployment");
        let [m1, m2, m3] = matchers();
        assert!(!match_document(&m1, &doc));
        assert!(!match_document(&m2, &doc));
        assert!(match_document(&m3, &doc));
    }

    #[test]
    fn empty_match_selects_nothing() {
        let doc = document("testing", "123", "test-deployment");
        assert!(!match_document(&Match::default(), &doc));
    }

    #[test]
    fn name_only_match() {
        let doc = document("testing", "123", "d");
        let m = Match {
            name: Some("testing".to_string()),
            ..Default::default()
        };
        assert!(match_document(&m, &doc));
    }

    #[test]
    fn undecodable_document_never_matches() {
        assert!(!match_document(&Match::product("testing", "123"), b"product: [unclosed"));
    }

    #[test]
    fn metadata_subset_is_enough() {
        let m = Match::metadata([("deployment", "d")]);
        let mut metadata = BTreeMap::new();
        metadata.insert("deployment".to_string(), "d".to_string());
        metadata.insert("zone".to_string(), "z1".to_string());
        assert!(m.matches(&Product::new("p", "1"), &metadata));
    }
}
