//! # Shopkeep Server
//!
//! Boots without a database, serves the setup API immediately, and opens the
//! configured database in the background.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  init_tracing()                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServerConfig::load()           env vars, setup-config.json location   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppContext (INITIALIZING)                                             │
//! │       │                                                                 │
//! │       ├──► spawn initialize_if_configured() ──► SETUP_REQUIRED /       │
//! │       │                                         READY / ERROR          │
//! │       ▼                                                                 │
//! │  axum::serve(...) until Ctrl+C / SIGTERM                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DynamicDatabase::shutdown()    close the pool                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use shopkeep_server::{build_router, AppContext, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Shopkeep server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        addr = %config.socket_addr(),
        setup_config = %config.setup_config_path.display(),
        connect_timeout_secs = config.db_connect_timeout.as_secs(),
        "Configuration loaded"
    );

    let ctx = Arc::new(AppContext::from_config(&config));

    // Setup routes answer while the persisted database is being opened
    let boot = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            ctx.db().initialize_if_configured().await;
            info!(state = %ctx.state().state(), "Boot initialization finished");
        })
    };

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    info!(addr = %config.socket_addr(), "HTTP server listening");

    axum::serve(listener, build_router(ctx.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    boot.abort();
    ctx.db().shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// Set `RUST_LOG` to override, e.g. `RUST_LOG=shopkeep=trace,sqlx=info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopkeep=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
