//! Patch documents: a selector plus ordered structural edit operations.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::patch::PatchPath;

/// A parsed patch document.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub api_version: String,
    pub matcher: Match,
    pub operations: Vec<Operation>,
}

/// Selects the documents a patch applies to.
///
/// `name`/`version` must equal the product identity when set; `metadata`
/// must be a subset of the document's metadata. A match with no
/// discriminator at all selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Match {
    pub name: Option<String>,
    pub version: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Match {
    /// Match on product identity.
    pub fn product(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            metadata: BTreeMap::new(),
        }
    }

    /// Match on a set of metadata pairs.
    pub fn metadata<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: None,
            version: None,
            metadata: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add metadata conditions to an existing match.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True when no discriminator is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.version.is_none() && self.metadata.is_empty()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name: {} version: {}",
            self.name.as_deref().unwrap_or("*"),
            self.version.as_deref().unwrap_or("*")
        )?;
        for (k, v) in &self.metadata {
            write!(f, " {}: {}", k, v)?;
        }
        Ok(())
    }
}

/// Patch operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Replace,
    Remove,
    Test,
}

impl OperationKind {
    /// Whether the operation carries a `value`.
    pub fn requires_value(self) -> bool {
        !matches!(self, OperationKind::Remove)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Add => write!(f, "add"),
            OperationKind::Replace => write!(f, "replace"),
            OperationKind::Remove => write!(f, "remove"),
            OperationKind::Test => write!(f, "test"),
        }
    }
}

/// A single edit. `value` is an untyped YAML node; it only becomes part of a
/// typed [`crate::Document`] after all patches have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub path: PatchPath,
    pub value: Option<serde_yaml::Value>,
}

impl Operation {
    pub fn new(kind: OperationKind, path: PatchPath, value: Option<serde_yaml::Value>) -> Self {
        Self { kind, path, value }
    }
}
