use anyhow::{Context, Result};
use std::sync::Arc;

use crate::app::app;
use crate::config::AppConfig;
use crate::database::store::Store;
use crate::state::AppState;

/// Bind, serve until ctrl-c, then drain in-flight requests
pub async fn serve(store: Arc<dyn Store>, config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(store, config);
    let router = app(state, config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Cat API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
