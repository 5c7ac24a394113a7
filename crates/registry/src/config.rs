//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Indicator registry: serves patched indicator documents, alert rules and
/// dashboards over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "indicator-registry", about = "Indicator document registry")]
pub struct RegistryConfig {
    /// Address to bind
    #[arg(long, env = "REGISTRY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "REGISTRY_PORT", default_value = "10567")]
    pub port: u16,

    /// Directory of indicator documents loaded at startup
    #[arg(long, env = "REGISTRY_DOCUMENTS_DIR")]
    pub documents_dir: Option<PathBuf>,

    /// Directory of patch documents, applied in file-name order
    #[arg(long, env = "REGISTRY_PATCHES_DIR")]
    pub patches_dir: Option<PathBuf>,

    /// Reload documents and patches when files change
    #[arg(long, env = "REGISTRY_WATCH", default_value_t = false)]
    pub watch: bool,
}

impl RegistryConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces() {
        let config = RegistryConfig::parse_from(["indicator-registry"]);
        assert_eq!(config.port, 10567);
        assert!(!config.watch);
        assert!(config.documents_dir.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = RegistryConfig::parse_from([
            "indicator-registry",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--documents-dir",
            "/srv/indicators",
            "--watch",
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.documents_dir, Some(PathBuf::from("/srv/indicators")));
        assert!(config.watch);
    }
}
