mod config;
mod controllers;
mod db;
mod frame;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, ConfigError};
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgStore;
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("hydration failed: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(db::init_pool(url, config.db_max_connections).await?)),
        None => {
            warn!("DATABASE_URL not set; rooms and messages will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = state::AppState::new(store, &config);
    services::persistence::hydrate(&state).await?;

    // Spawn background persistence task.
    let _persistence = services::persistence::spawn_persistence_task(state.clone(), config.flush_interval_ms);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "binchat listening");
    axum::serve(listener, app).await?;
    Ok(())
}
