use anyhow::Result;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod routes;
mod services;
pub mod models;

use services::store::DatasetStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::load_config()?;

    // Initial load; the server still starts without data so a later reload can recover
    let store = DatasetStore::new();
    if let Err(e) = store.reload(&config.workbook_path, &config.people) {
        tracing::error!("Initial load of {} failed: {}", config.workbook_path.display(), e);
    }

    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(config, store));
    let app = routes::router(state);

    // Run it
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
pub struct AppState {
    config: config::Config,
    store: DatasetStore,
}

impl AppState {
    fn new(config: config::Config, store: DatasetStore) -> Self {
        Self { config, store }
    }
}
