//! relay-hub server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use tracing_subscriber::EnvFilter;

use relay_hub::config::HubConfig;
use relay_hub::{build_app, build_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = HubConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting relay-hub");

    let app = build_app(build_state(config.connection_settings()));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
