//! Patch engine: ordered structural edits applied to raw document bytes.

mod ops;
mod path;

use serde_yaml::Value;
use tracing::{debug, trace};

use crate::error::Result;
use crate::matcher::match_document;
use crate::schema::Patch;

pub use path::{InvalidPath, PatchPath, Segment};

/// How far a single patch got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Every operation ran.
    Applied,
    /// A `test` at this operation index failed; earlier operations stay.
    Aborted { at: usize },
}

/// Apply `patches` in order to `raw`, returning the patched YAML bytes.
///
/// Each patch is matched against the bytes produced by the patches before
/// it, so an earlier patch can make a later one match. Non-matching
/// patches are skipped. An unresolvable path fails the whole call.
pub fn apply_patches(patches: &[Patch], raw: &[u8]) -> Result<Vec<u8>> {
    let mut current = raw.to_vec();
    for (i, patch) in patches.iter().enumerate() {
        if !match_document(&patch.matcher, &current) {
            trace!(patch = i, matcher = %patch.matcher, "patch does not match");
            continue;
        }

        let mut tree: Value = serde_yaml::from_slice(&current)?;
        match apply_operations(&mut tree, patch)? {
            PatchOutcome::Applied => debug!(patch = i, matcher = %patch.matcher, "applied patch"),
            PatchOutcome::Aborted { at } => {
                debug!(patch = i, operation = at, "patch test failed, skipping remaining operations")
            }
        }
        current = serde_yaml::to_string(&tree)?.into_bytes();
    }
    Ok(current)
}

/// Apply one patch's operations to a decoded tree, in order.
pub fn apply_operations(tree: &mut Value, patch: &Patch) -> Result<PatchOutcome> {
    for (i, operation) in patch.operations.iter().enumerate() {
        if ops::apply(tree, operation)? == ops::Step::Abort {
            return Ok(PatchOutcome::Aborted { at: i });
        }
    }
    Ok(PatchOutcome::Applied)
}

#[cfg(test)]
mod tests;
