use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use indicator_protocol::loader::{LoadStatus, SourceLoader};
use indicator_protocol::AggregationStore;
use indicator_registry::{build_router, config, AppState, RegistryConfig};

/// Load file-sourced documents and patches, logging each failure.
fn load_sources(config: &RegistryConfig, store: &Arc<AggregationStore>) -> anyhow::Result<Option<SourceLoader>> {
    let Some(documents_dir) = config.documents_dir.clone() else {
        if config.patches_dir.is_some() {
            warn!("patches directory set without a documents directory; ignoring it");
        }
        return Ok(None);
    };

    let mut loader = SourceLoader::new(documents_dir, config.patches_dir.clone());
    let results = loader.load_all(store);

    let mut loaded = 0usize;
    for result in &results {
        match &result.status {
            LoadStatus::Loaded { .. } => loaded += 1,
            LoadStatus::Failed { error } => {
                warn!(path = %result.path.display(), kind = %result.kind, error = %error, "failed to load source");
            }
            LoadStatus::Skipped { .. } => {}
        }
    }
    info!(
        loaded,
        documents = store.len(),
        patches = store.patches().len(),
        "loaded indicator sources"
    );

    if config.watch {
        loader.watch(Arc::clone(store))?;
    }
    Ok(Some(loader))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let config = RegistryConfig::parse();
    let store = Arc::new(AggregationStore::new());

    // Held for the lifetime of the server; dropping it stops the watcher.
    let _loader = load_sources(&config, &store)?;

    let app = build_router(Arc::new(AppState::new(store)?));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Registry listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
