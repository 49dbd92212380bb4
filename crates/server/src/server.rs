//! HTTP server for the ticket relay

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;

use crate::routes::{router, AppState};

/// Run the HTTP server until Ctrl+C.
pub async fn run(state: AppState, bind: SocketAddr) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
