//! Application builder — binds the router to a listener and serves.

use std::sync::Arc;

use famcast_core::config::AppConfig;
use famcast_core::error::AppError;
use famcast_relay::engine::RelayEngine;

use crate::router::build_router;
use crate::state::AppState;

/// Runs the FamCast server until shutdown.
pub async fn run_server(config: AppConfig, engine: Arc<RelayEngine>) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(config), engine.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("FamCast server listening on {}", addr);

    let shutdown_engine = engine.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_engine.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
}
