//! Indicator document protocol.
//!
//! This crate provides:
//! - Typed indicator documents parsed from YAML, with defaults and validation
//! - Patch documents: a selector plus ordered structural edit operations
//! - A patch engine with attribute-addressed paths and `test` guards
//! - An aggregation store that applies patches on every render
//! - Alert-rule and dashboard renderers
//! - Filesystem source discovery with hot reload
//! - Reconciliation controllers driven by typed resource events

pub mod error;
pub mod loader;
pub mod matcher;
pub mod patch;
pub mod read;
pub mod reconcile;
pub mod render;
pub mod schema;
pub mod store;

pub use error::{ProtocolError, Result};
pub use matcher::match_document;
pub use patch::apply_patches;
pub use read::{read_document, read_patch, ReadOptions};
pub use schema::{Document, Match, Patch};
pub use store::{AggregationStore, DocumentKey};
