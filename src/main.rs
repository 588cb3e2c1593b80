//! Application entry point and server initialization
//!
//! This is the composition root: it loads configuration, opens the store,
//! builds the link service and liveness probe, and serves the router with
//! graceful shutdown support.

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use url_shortener::config::Settings;
use url_shortener::database::UrlStore;
use url_shortener::liveness::HttpProbe;
use url_shortener::route::{create_app, AppState};
use url_shortener::service::LinkService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("url_shortener=debug,tower_http=debug")),
        )
        .init();

    let settings = Settings::from_env()?;

    let store = UrlStore::open(&settings.database_url)?;
    let links = LinkService::new(store, settings.link_options());
    let probe = HttpProbe::new(settings.probe_timeout)?;
    let state = AppState::new(links, Arc::new(probe), settings.base_url.clone());

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(settings.bind_addr()).await?;

    info!(
        env = %settings.env_name,
        addr = %settings.bind_addr(),
        base_url = %settings.base_url,
        database = %settings.database_url,
        "server running"
    );

    // The server will continue running until it receives SIGTERM or SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM
///
/// Open connections are allowed to complete before the process exits, so no
/// write transaction is cut off halfway.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
