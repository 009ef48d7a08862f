//! `lectern` - caching reverse proxy for a lecture schedule
//!
//! Polls the upstream every interval, rebrands the content and serves the
//! last good copy from memory.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod render;
mod server;

use std::sync::Arc;

use anyhow::Context;
use lectern_core::{Config, Refresher, Scheduler, SnapshotStore};
use lectern_upstream::{HttpTransport, Rewriter};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server::{AppState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lectern=info,lectern_core=info,lectern_upstream=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.listen_addr,
        environment = ?config.server.environment,
        "Starting lectern"
    );

    let store = SnapshotStore::new();
    let transport = HttpTransport::new(config.upstream.timeout)?;
    let rewriter = Rewriter::with_brand(&config.brand)?;
    let refresher = Arc::new(Refresher::from_config(
        transport,
        &config.upstream,
        rewriter,
        store.clone(),
    )?);
    let scheduler = Scheduler::spawn(refresher, config.refresh);

    let state = AppState {
        store,
        environment: config.server.environment,
        brand: Arc::from(config.brand.as_str()),
    };
    let app = create_router(state, &config.server);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;
    info!("Server listening on {}", config.server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    info!("lectern stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
