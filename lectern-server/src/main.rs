//! Lectern Server - reader API over a processed book

use anyhow::Result;
use lectern_server::{routes, state};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ports tried after the preferred one
const PORT_ATTEMPTS: u16 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectern_server=debug,lectern_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = state::ServerConfig::from_env()?;
    tracing::info!(
        books_dir = %config.books_dir.display(),
        cache_dir = %config.cache_dir.display(),
        "Loaded configuration"
    );

    let state = state::AppState::from_config(&config).await?;
    let app = routes::create_router(state);

    let listener = bind_first_free(config.port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind the preferred port, or the next free one within range
async fn bind_first_free(preferred: u16) -> Result<TcpListener> {
    let mut last_error = None;
    for port in preferred..=preferred.saturating_add(PORT_ATTEMPTS) {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                tracing::debug!("Port {} unavailable: {}", port, e);
                last_error = Some(e);
            }
        }
    }

    let error = last_error
        .map(anyhow::Error::from)
        .unwrap_or_else(|| anyhow::anyhow!("no port to try"));
    Err(error.context(format!(
        "No free port in {}..={}",
        preferred,
        preferred.saturating_add(PORT_ATTEMPTS)
    )))
}
