//! Runs the HTTP document service over an in-memory store.
//!
//! Configured from `STOCKROOM_*` environment variables; log level from `RUST_LOG`.

use std::error::Error;
use std::sync::Arc;

use stockroom::{server, Config, InMemoryDocumentStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let addr = config.socket_addr()?;

    let store = Arc::new(InMemoryDocumentStore::new());
    let app = server::router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        collection = %config.collection,
        "document service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("document service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
