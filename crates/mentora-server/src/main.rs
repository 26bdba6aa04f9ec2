//! Mentora Server: application entry point.

use mentora_db::{DbManager, run_migrations};
use mentora_server::{AppState, ServerConfig, build_router, init_tracing};
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();
    init_tracing(config.log_json)?;

    info!("Starting Mentora server...");

    let manager = DbManager::connect(&config.db).await?;
    run_migrations(manager.client()).await?;

    let state = AppState::new(manager.client().clone(), config.matching.clone())?;
    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind).await?;
    info!(bind = %config.bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    info!("Mentora server stopped.");
    Ok(())
}
