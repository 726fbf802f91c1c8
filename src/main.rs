use std::sync::Arc;

use anyhow::Context;

use toolshed::app::AppState;
use toolshed::config::{AppConfig, StoreBackend};
use toolshed::db::content_store::{ContentStore, MongoContentStore};
use toolshed::db::memory_store::MemoryContentStore;
use toolshed::db::settings_repository::{
    MemorySettingsRepository, MongoSettingsRepository, SettingsRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolshed=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting Toolshed server...");

    let config = AppConfig::load().context("Failed to load configuration")?;

    let (content_store, settings_repo): (Arc<dyn ContentStore>, Arc<dyn SettingsRepository>) =
        match config.store {
            StoreBackend::Memory => {
                tracing::info!("Using in-memory content store");
                (
                    Arc::new(MemoryContentStore::new()),
                    Arc::new(MemorySettingsRepository::new()),
                )
            }
            StoreBackend::Mongo => {
                let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri)
                    .await
                    .context("Failed to connect to MongoDB")?;
                let mongo_db = mongo_client.database(&config.mongodb_database);

                let store = MongoContentStore::new(&mongo_db);
                store
                    .ensure_indexes()
                    .await
                    .context("Failed to create MongoDB indexes")?;

                tracing::info!("Connected to MongoDB at {}", config.mongodb_uri);
                (
                    Arc::new(store),
                    Arc::new(MongoSettingsRepository::new(&mongo_db)),
                )
            }
        };

    toolshed::install::run(content_store.as_ref(), settings_repo.as_ref())
        .await
        .context("Install bootstrap failed")?;

    if config.demo_mode {
        toolshed::demo_seeder::seed_demo_data(content_store.as_ref()).await;
    }

    let app_state = AppState::new(&config, content_store, settings_repo);
    let app = toolshed::api::routes::build_router(app_state);

    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
