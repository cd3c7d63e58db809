//! Mini Cache - HTTP server over a policy-driven in-memory cache
//!
//! Serves one thread-safe cache and persists it to a snapshot file across
//! restarts.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::api::create_router;
use mini_cache::{persist_cache, AppState, Config};

/// Main entry point for the Mini Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache, restoring the snapshot if one exists
/// 4. Create Axum router with all endpoints
/// 5. Serve until SIGINT/SIGTERM
/// 6. Write a final snapshot
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Cache Server");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        "Configuration loaded: policy={}, max_entries={}, port={}, snapshot={:?}, compressed={}",
        config.policy,
        config.max_entries,
        config.server_port,
        config.snapshot_path,
        config.snapshot_compressed
    );

    let state = AppState::from_config(&config).context("Failed to open cache")?;
    info!(entries = state.cache.len(), "Cache initialized");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    match persist_cache(&*state.cache, &*state.cache_config) {
        Ok(true) => info!("Final snapshot written"),
        Ok(false) => info!("No snapshot path configured, cache contents dropped"),
        Err(e) => warn!(error = %e, "Failed to write final snapshot"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
