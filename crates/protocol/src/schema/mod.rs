//! Typed indicator and patch documents.
//!
//! Defines the complete type hierarchy:
//! - `Document`: product identity, metadata, indicators and the resolved layout
//! - `Indicator` / `Threshold`: PromQL metrics with alert thresholds
//! - `Patch`: a `Match` selector plus ordered `Operation`s
//!
//! The `raw` module holds the on-the-wire shapes that [`crate::read`] decodes
//! before defaults and validation produce the typed values.

mod document;
mod indicator;
mod patch;
pub(crate) mod raw;
mod threshold;

pub use document::*;
pub use indicator::*;
pub use patch::*;
pub use threshold::*;
