//! FitTrack
//!
//! HTTP server for workout, nutrition and body metrics tracking.

use fittrack::build_info;
use fittrack::config::ServerConfig;
use fittrack::logging;
use fittrack::routes::{router, AppState};
use fittrack::storage::{create_storage, StorageBackend};
use tokio::net::TcpListener;
use tracing::info;

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    logging::init();

    build_info::print_startup_banner(config.backend.as_str());
    if config.backend != StorageBackend::Memory {
        eprintln!("Database path: {}", config.database);
    }

    let storage = create_storage(config.backend, config.database.clone());
    storage.connect().await?;

    let addr = config.bind_address();
    let app = router(AppState::new(storage.clone(), config));

    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.disconnect().await?;
    Ok(())
}
