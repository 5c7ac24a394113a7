//! Patch path grammar.
//!
//! ```text
//! /indicators/name=error_rate/thresholds?/-
//! ```
//!
//! Segments follow a leading `/`. `~1` and `~0` unescape to `/` and `~`.

use std::fmt;

/// One step of a [`PatchPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Mapping key. `optional` keys (`key?`) are created when missing.
    Key { name: String, optional: bool },
    /// Sequence position; on a mapping the raw text is used as a key.
    Index { index: usize, raw: String },
    /// First (or, for `remove`, every) sequence element whose `key` equals `value`.
    Attribute { key: String, value: String },
    /// End of a sequence; only valid as the final segment.
    Append,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "-" {
            return Segment::Append;
        }
        if let Some(name) = raw.strip_suffix('?') {
            return Segment::Key {
                name: unescape(name),
                optional: true,
            };
        }
        if let Some((key, value)) = raw.split_once('=') {
            return Segment::Attribute {
                key: unescape(key),
                value: unescape(value),
            };
        }
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = raw.parse() {
                return Segment::Index {
                    index,
                    raw: raw.to_string(),
                };
            }
        }
        Segment::Key {
            name: unescape(raw),
            optional: false,
        }
    }

    /// Whether a container created for this segment must be a sequence.
    pub(crate) fn wants_sequence(&self) -> bool {
        matches!(
            self,
            Segment::Append | Segment::Attribute { .. } | Segment::Index { .. }
        )
    }
}

/// A parsed, validated patch path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPath {
    raw: String,
    segments: Vec<Segment>,
}

/// A path string that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid patch path '{path}': {reason}")]
pub struct InvalidPath {
    pub path: String,
    pub reason: &'static str,
}

impl PatchPath {
    pub fn parse(raw: &str) -> Result<Self, InvalidPath> {
        let invalid = |reason| InvalidPath {
            path: raw.to_string(),
            reason,
        };

        let body = raw
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        if body.is_empty() {
            return Err(invalid("must address at least one segment"));
        }

        let parts: Vec<&str> = body.split('/').collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }
            let segment = Segment::parse(part);
            if segment == Segment::Append && i + 1 != parts.len() {
                return Err(invalid("'-' must be the final segment"));
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for PatchPath {
    type Err = InvalidPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatchPath::parse(s)
    }
}

fn unescape(s: &str) -> String {
    s.replace("~1", "/").replace("~0", "~")
}
