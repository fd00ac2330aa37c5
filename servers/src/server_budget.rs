//! # Budget Store Status Server
//!
//! Composition root for the budget backend's store access. It builds the one
//! `ConnectionCache` the process uses, shares it with the HTTP handlers and
//! serves a small status API:
//!
//! - `GET /health` answers without touching the store.
//! - `GET /api/store` connects on first use, then pings the cached database.
//! - `GET /api/store/state` reports whether the connection has been made.
//!
//! The store itself is located through `DATABASE_URL` and `DATABASE_NAME`
//! (read when the first connection is attempted, a `.env` file is honoured).
//! Server settings come from defaults, `server_budget.conf` and `BUDGET_*`
//! variables / command-line flags, in that order.

use anyhow::Result;
use lib_store::configs::config_store::{load_dotenv, EnvConfigSource};
use lib_store::connections::db_postgres::PostgresDriver;
use lib_store::loggers::init_tracing;
use lib_store::ConnectionCache;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

mod budget_logic;
use budget_logic::{config, routes, state};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_path = load_dotenv()?;

    let settings = config::load_config();
    init_tracing(&settings.log_level, settings.log_json)?;

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }
    info!(
        "Configuration loaded: Port: {}, Pool size: {}, Acquire timeout: {:?}",
        settings.port, settings.max_connections, settings.acquire_timeout
    );

    let driver = PostgresDriver::new(settings.max_connections, settings.acquire_timeout);
    let cache = Arc::new(ConnectionCache::new(driver, EnvConfigSource::new()));
    let app = routes::router(state::AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        tracing::warn!("Could not install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }
}
