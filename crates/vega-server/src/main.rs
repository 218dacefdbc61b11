//! Vega Video server entry point.
//!
//! Loads the avatar catalog and vendor settings, then starts the Axum HTTP
//! server with graceful shutdown. A background session expiry worker runs
//! alongside the server and is stopped on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use vega_core::catalog::Catalog;
use vega_core::client::LipsyncClient;
use vega_core::script::PlaceholderScript;

use vega_server::config::ServerConfig;
use vega_server::routes;
use vega_server::sessions::SessionStore;
use vega_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        endpoint = %config.generation.endpoint,
        credential = %config.generation.credential.describe(),
        "Vega Video starting"
    );

    let state = build_app_state(&config)?;

    // Shutdown signal channel.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn session expiry background worker.
    let sweeper_handle = {
        let st = Arc::clone(&state);
        let mut rx = shutdown_rx.clone();
        let interval = config.session_sweep_interval;
        tokio::spawn(async move {
            session_expiry_worker(&st.sessions, &mut rx, interval).await;
        })
    };

    let app = routes::build_router(Arc::clone(&state));

    // Bind and serve.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Vega Video server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    // Wait for background workers to finish (with timeout).
    info!("waiting for background workers to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), sweeper_handle).await;

    info!("Vega Video server stopped");
    Ok(())
}

/// Build the shared application state.
fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load avatar catalog from {}", path.display()))?,
        None => {
            info!("using built-in avatar catalog");
            Catalog::builtin()
        }
    };
    info!(
        avatars = catalog.len(),
        ready = catalog.avatars().iter().filter(|a| a.is_generation_ready()).count(),
        "avatar catalog loaded"
    );

    let client = LipsyncClient::new(&config.generation)
        .context("failed to build lip-sync vendor client")?;

    Ok(Arc::new(AppState::new(
        Arc::new(catalog),
        Arc::new(PlaceholderScript),
        Arc::new(client),
        config.generation.defaults.clone(),
        config.session_ttl,
    )))
}

/// Background worker that periodically drops idle wizard sessions.
///
/// Expiring a session cancels its in-flight generation request, so the
/// vendor response is discarded when it eventually arrives.
async fn session_expiry_worker(
    sessions: &SessionStore,
    shutdown: &mut watch::Receiver<bool>,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);
    info!(interval_secs = every.as_secs(), "session expiry worker started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sessions.sweep_expired().await;
            }
            _ = shutdown.changed() => {
                info!("session expiry worker shutting down");
                return;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
