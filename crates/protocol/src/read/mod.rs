//! Reading raw YAML into typed documents and patches.
//!
//! Document reading runs in a fixed order:
//! 1. decode the identity envelope and interpolate `$metadata` references
//! 2. decode the raw shape
//! 3. apply field defaults and chart-type validation
//! 4. resolve each threshold's comparator
//! 5. synthesize the default layout when none is given
//! 6. resolve section references to top-level indicators
//!
//! Decode failures are [`ProtocolError::Parse`]; everything after decoding
//! fails with [`ProtocolError::Validation`]. No partial document is returned.

pub(crate) mod duration;
mod interpolate;
mod validate;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ProtocolError, Result};
use crate::patch::PatchPath;
use crate::schema::raw::{RawDocument, RawEnvelope, RawPatch};
use crate::schema::{Document, Match, Operation, Patch};

pub use interpolate::interpolate;

/// Options controlling [`read_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Substitute `$key` references with metadata values before decoding.
    pub interpolate: bool,
    /// Replaces the document's own metadata, both for interpolation and in
    /// the returned document.
    pub override_metadata: Option<BTreeMap<String, String>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            interpolate: true,
            override_metadata: None,
        }
    }
}

impl ReadOptions {
    pub fn skip_metadata_interpolation(mut self) -> Self {
        self.interpolate = false;
        self
    }

    pub fn override_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.override_metadata = Some(metadata);
        self
    }
}

/// Parse and validate an indicator document.
pub fn read_document(raw: &[u8], options: &ReadOptions) -> Result<Document> {
    let text = std::str::from_utf8(raw)?;

    let envelope: RawEnvelope = serde_yaml::from_str(text)?;
    let metadata = options
        .override_metadata
        .clone()
        .unwrap_or(envelope.metadata);

    let decoded: RawDocument = if options.interpolate && !metadata.is_empty() {
        serde_yaml::from_str(&interpolate(text, &metadata))?
    } else {
        serde_yaml::from_str(text)?
    };

    let mut document = validate::build_document(decoded)?;
    document.metadata = metadata;
    debug!(
        product = %document.product.name,
        indicators = document.indicators.len(),
        "read indicator document"
    );
    Ok(document)
}

/// Parse a patch document, validating operation paths and required values.
pub fn read_patch(raw: &[u8]) -> Result<Patch> {
    let decoded: RawPatch = serde_yaml::from_slice(raw)?;

    let operations = decoded
        .operations
        .into_iter()
        .enumerate()
        .map(|(i, op)| {
            let path = PatchPath::parse(&op.path)
                .map_err(|e| ProtocolError::validation(format!("operations[{}]: {}", i, e)))?;
            if op.kind.requires_value() && op.value.is_none() {
                return Err(ProtocolError::validation(format!(
                    "operations[{}]: '{}' at '{}' requires a value",
                    i, op.kind, path
                )));
            }
            Ok(Operation::new(op.kind, path, op.value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Patch {
        api_version: decoded.api_version,
        matcher: Match {
            name: decoded.matcher.product.name,
            version: decoded.matcher.product.version,
            metadata: decoded.matcher.metadata,
        },
        operations,
    })
}
