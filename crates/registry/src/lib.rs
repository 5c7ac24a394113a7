//! HTTP registry for indicator documents.
//!
//! Serves the patched view of every registered or file-sourced document,
//! plus the alert rules and dashboards rendered from them.

pub mod api;
pub mod config;
pub mod metrics;
pub mod router;
pub mod state;

pub use config::RegistryConfig;
pub use router::build_router;
pub use state::AppState;
