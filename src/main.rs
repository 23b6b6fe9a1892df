use lingoforge::config::AppConfig;
use lingoforge::content_store::HttpContentStore;
use lingoforge::db::{DbLedger, LinkLedger, MemoryLedger};
use lingoforge::routes;
use lingoforge::services::AppState;
use lingoforge::storage::{BlobStore, HttpBlobStore, MemoryBlobStore};
use lingoforge::translate::{HttpTranslator, MockTranslator, Translator};

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::build().expect("Failed to load configuration");

    // 2. Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.rust_log))
        .init();

    tracing::info!("Starting lingoforge...");

    // 3. External collaborators. A `mock` key or `memory` database URL
    // selects the in-process stand-in for local runs.
    let store = Arc::new(HttpContentStore::new(config.content_store.clone()));

    let translator: Arc<dyn Translator> = if config.translation.api_key == "mock" {
        Arc::new(MockTranslator::new())
    } else {
        Arc::new(HttpTranslator::new(config.translation.clone()))
    };

    let blob_store: Arc<dyn BlobStore> = if config.storage.api_key == "mock" {
        Arc::new(MemoryBlobStore::new())
    } else {
        Arc::new(HttpBlobStore::new(config.storage.clone()))
    };

    let ledger: Arc<dyn LinkLedger> = if config.database.url == "memory" {
        Arc::new(MemoryLedger::new())
    } else {
        let ledger = DbLedger::new(&config.database).await?;
        tracing::info!("Connected to database");
        Arc::new(ledger)
    };

    // 4. Wire services and router
    let port = config.server.port;
    let state = AppState::new(config, store, translator, blob_store, ledger);
    let app = routes::create_router(state);

    // 5. Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
