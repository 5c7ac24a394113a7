//! Per-file load outcomes.

use std::fmt;
use std::path::PathBuf;

/// What a source file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Document,
    Patch,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Document => write!(f, "document"),
            SourceKind::Patch => write!(f, "patch"),
        }
    }
}

/// Outcome of loading a single source file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    pub kind: SourceKind,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

impl LoadResult {
    pub(super) fn skipped(path: PathBuf, kind: SourceKind, reason: &str) -> Self {
        Self {
            path,
            kind,
            status: LoadStatus::Skipped {
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, LoadStatus::Failed { .. })
    }
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Documents carry their store key; patches their position in the patch set.
    Loaded { id: String },
    /// File was skipped (dotfile, non-YAML, etc.).
    Skipped { reason: String },
    /// Parse or validation error occurred.
    Failed { error: String },
}
