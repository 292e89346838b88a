mod app;
mod config;
mod db;
mod errors;
mod logging;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod utils;
mod views;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::logging::LoggingConfig;
use crate::state::AppState;
use crate::store::StockStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let store = StockStore::connect(&config.store).await.map_err(|e| {
        tracing::error!("Stock store initialization failed: {}", e);
        e
    })?;

    let app = app::create_app(AppState { store });

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Stock ledger running at http://{}/stocks", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
