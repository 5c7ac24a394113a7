//! Error types shared by every stage of the protocol pipeline.

/// Errors that can occur while reading, patching, rendering or loading documents.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Raw bytes that are not UTF-8 text.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Well-formed input that violates a document rule (bad chart type,
    /// threshold without a comparator, dangling section reference, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A patch path that cannot be resolved against the target document.
    #[error("cannot resolve patch path '{path}': {reason}")]
    Address { path: String, reason: String },

    /// JSON encoding error while producing a rendered artifact.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template rendering failed while producing documentation HTML.
    #[error("Template rendering failed: {0}")]
    Template(String),

    /// An artifact sink rejected a create/update/delete.
    #[error("artifact sink error: {0}")]
    Sink(String),

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

impl ProtocolError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ProtocolError::Validation(message.into())
    }

    pub(crate) fn address(path: impl ToString, reason: impl Into<String>) -> Self {
        ProtocolError::Address {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures to decode the input bytes at all.
    pub fn is_parse(&self) -> bool {
        matches!(self, ProtocolError::Parse(_) | ProtocolError::Encoding(_))
    }

    /// True for well-formed input rejected by document rules.
    pub fn is_validation(&self) -> bool {
        matches!(self, ProtocolError::Validation(_))
    }

    /// True for patch paths that did not resolve.
    pub fn is_address(&self) -> bool {
        matches!(self, ProtocolError::Address { .. })
    }
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
