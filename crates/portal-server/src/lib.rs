//! HTTP API of SA Daily Portal.
//!
//! Weather reports for coordinates or place names, football scores and
//! standings, the SASSA payment schedule, guides, the contact form and the
//! redirects for old page paths. Static assets are served from the configured
//! directory.

use anyhow::{Context, Result};
use portal_core::Config;
use tokio::signal;
use tracing::{error, info};

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{redirect_target, routes, status_body, weather_report, WeatherQuery, VERSION};
pub use state::State;

/// Builds the services from `config` and serves until Ctrl+C or SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing state...");
    let state = State::from_config(&config)?;

    let address = config.bind_address();
    let socket = tokio::net::lookup_host(&address)
        .await
        .with_context(|| format!("Failed to resolve {}", address))?
        .next()
        .with_context(|| format!("No address for {}", address))?;

    info!("Binding to {}", socket);
    let (bound, server) = warp::serve(routes(state, config.server.static_dir.clone()))
        .try_bind_with_graceful_shutdown(socket, shutdown_signal())
        .with_context(|| format!("Failed to bind {}", socket))?;

    info!("Server running on {}", bound);
    server.await;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
