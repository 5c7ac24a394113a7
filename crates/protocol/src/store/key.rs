//! Registry identity of a stored document.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::schema::Document;

const DEFAULT_NAMESPACE: &str = "default";

/// `namespace/name` identity. Ordering is lexicographic on
/// `(namespace, name)`, which fixes the order of rendered outputs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DocumentKey {
    pub namespace: String,
    pub name: String,
}

impl DocumentKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity for a registered document: the product name as namespace
    /// and a hash of the sorted metadata as name, so re-registering the
    /// same deployment replaces its previous version.
    pub fn for_document(document: &Document) -> Self {
        // Length-prefixed so no key or value can forge a field boundary.
        let mut hasher = Sha256::new();
        for (k, v) in &document.metadata {
            for field in [k, v] {
                hasher.update((field.len() as u64).to_le_bytes());
                hasher.update(field.as_bytes());
            }
        }
        let digest = format!("{:x}", hasher.finalize());
        Self::new(document.product.name.clone(), &digest[..16])
    }

    /// Identity for a file on disk: parent directory name and file stem.
    pub fn for_path(path: &Path) -> Self {
        let namespace = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let name = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(namespace, name)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
