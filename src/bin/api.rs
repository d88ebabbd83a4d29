//! Prospect API Server
//!
//! Run with: cargo run --bin prospect-api
//!
//! # Configuration
//!
//! Settings come from the first config file found (see `prospect config`),
//! then environment overrides:
//! - `PROSPECT_DATA_DIR`: Data directory
//! - `PROSPECT_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `PROSPECT_API_PORT`: Port to listen on (default: 8090)
//! - `PROSPECT_LOG_LEVEL`: Log level (default: info)
//! - `PROSPECT_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Overrides the log filter entirely

use anyhow::Context;
use prospect::api::{serve, AppState};
use prospect::config::{Config, LoggingConfig};
use prospect::store::Store;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Prospect API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", config.storage.data_dir);

    let store = Store::open(config.storage.store_config())
        .await
        .with_context(|| format!("opening store at {}", config.storage.data_dir))?;
    let stats = store.stats().await;
    tracing::info!("Store opened ({})", stats);

    let state = AppState::new(Arc::new(store), config.api.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await.context("API server failed")?;

    tracing::info!("Prospect API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("prospect={},tower_http=debug", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
