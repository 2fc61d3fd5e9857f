use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cafe_manager::config::AppConfig;
use cafe_manager::{create_router, initialize_backend};

const PAIRING_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Loading configuration");
    let config = AppConfig::load()?;
    let addr = config.bind_address;

    let app_state = initialize_backend(config).await?;

    // Expired pairing sessions are also dropped lazily; this keeps the store tidy
    let pairing_service = app_state.pairing_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PAIRING_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = pairing_service.purge_expired(Utc::now()).await {
                warn!("Failed to purge expired pairing sessions: {}", e);
            }
        }
    });

    let app = create_router(app_state)?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
