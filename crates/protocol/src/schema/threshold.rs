//! Threshold comparators.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Threshold comparison operator.
///
/// The ordering is significant: renderers group `<= LessThanOrEqualTo` as
/// "below" and `>= GreaterThanOrEqualTo` as "above".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    LessThan,
    LessThanOrEqualTo,
    EqualTo,
    NotEqualTo,
    GreaterThanOrEqualTo,
    GreaterThan,
}

impl Operator {
    /// All operators in comparator-field order (`lt`, `lte`, `eq`, `neq`, `gte`, `gt`).
    pub const ALL: [Operator; 6] = [
        Operator::LessThan,
        Operator::LessThanOrEqualTo,
        Operator::EqualTo,
        Operator::NotEqualTo,
        Operator::GreaterThanOrEqualTo,
        Operator::GreaterThan,
    ];

    /// Field name used in documents, e.g. `gte`.
    pub fn abbrev(self) -> &'static str {
        match self {
            Operator::LessThan => "lt",
            Operator::LessThanOrEqualTo => "lte",
            Operator::EqualTo => "eq",
            Operator::NotEqualTo => "neq",
            Operator::GreaterThanOrEqualTo => "gte",
            Operator::GreaterThan => "gt",
        }
    }

    /// PromQL comparison symbol, e.g. `>=`.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::LessThan => "<",
            Operator::LessThanOrEqualTo => "<=",
            Operator::EqualTo => "==",
            Operator::NotEqualTo => "!=",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::GreaterThan => ">",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.abbrev() == s)
            .ok_or_else(|| format!("unknown threshold operator: '{}'", s))
    }
}

/// A resolved alert threshold: exactly one comparator and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub level: String,
    pub operator: Operator,
    pub value: f64,
}

impl Threshold {
    pub fn new(level: impl Into<String>, operator: Operator, value: f64) -> Self {
        Self {
            level: level.into(),
            operator,
            value,
        }
    }
}

/// Serializes in document form: `{level: warning, gte: 50}`.
impl Serialize for Threshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry(self.operator.abbrev(), &self.value)?;
        map.end()
    }
}
