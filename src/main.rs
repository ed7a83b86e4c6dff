mod adapters;
mod application;
mod domain;
mod services;

use std::sync::Arc;

use adapters::{router::create_router, state::AppState};
use application::services::{RetentionSweeper, TransferService};
use domain::config::server::ServerConfig;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fast_transfer=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("ERROR: invalid configuration");

    tracing::info!(
        "Starting fast-transfer, storing files in {}",
        config.upload_dir.display()
    );

    let storage = services::create_storage_service(&config.upload_dir)
        .await
        .expect("ERROR: Failed to open the upload directory");

    // The sweeper only needs the store; it shares nothing else with requests.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = RetentionSweeper::new(storage.clone(), config.retention, config.sweep_interval);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown_rx));

    let app_state = AppState {
        config: Arc::new(config.clone()),
        transfer_service: Arc::new(TransferService::new(storage)),
    };
    let router = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .expect("Failed to bind to port");

    let url = services::connect_url(services::discover_local_ip().await, config.port);
    tracing::info!("Server listening on {}", config.bind_address());
    tracing::info!("Open {} on any device in the same network", url);
    match services::render_connect_qr(&url) {
        Ok(qr) => println!("Scan to connect:\n{}", qr),
        Err(e) => tracing::warn!("Cannot render connection QR code: {}", e),
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_handle.await {
        tracing::error!("Retention sweeper panicked: {}", e);
    }

    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
