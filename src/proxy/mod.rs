pub mod notion;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use notion::NotionClient;
use routes::ProxyState;

/// Serves `/api/notion` until Ctrl-C.
pub async fn serve(addr: SocketAddr, notion: NotionClient) -> Result<()> {
    let state = Arc::new(ProxyState { notion });
    let app = routes::get_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "proxy listening on http://{addr}/api/notion");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("proxy server failed")?;

    tracing::info!("proxy shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
