//! # Shopkeep Server
//!
//! HTTP API for the Shopkeep retail backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Routes                                          │
//! │                                                                         │
//! │  public               /setup/status   /setup/progress                  │
//! │                       /setup/database /setup/shop                      │
//! │                       /setup/admin    /setup/complete                  │
//! │                       /health                                          │
//! │                                                                         │
//! │  READY                /category  /settings                             │
//! │                       /products  /supplier  /customer   (501)          │
//! │                       /transactions  /inventory  /reports (501)        │
//! │                                                                         │
//! │  READY_OR_SETUP,      /users/admin                                     │
//! │  or no admin yet                                                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 AppContext (Arc, injected via State)              │  │
//! │  │   DynamicDatabase ── SetupConfigStore ── AppStateCell             │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `SHOPKEEP_BIND_ADDR` - listen address (default: 0.0.0.0)
//! - `SHOPKEEP_HTTP_PORT` - HTTP port (default: 3001)
//! - `SHOPKEEP_SETUP_CONFIG_PATH` - setup document (default: platform data dir)
//! - `SHOPKEEP_DB_CONNECT_TIMEOUT_SECS` - connect timeout (default: 10)
//! - `SHOPKEEP_DB_MAX_CONNECTIONS` - pool size (default: 10)

pub mod admission;
pub mod config;
pub mod error;
pub mod password;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::sync::Mutex;

use shopkeep_core::Admission;
use shopkeep_db::{AppStateCell, DynamicDatabase, PoolSettings, SetupConfigStore};

// Re-exports
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};

// =============================================================================
// Application Context
// =============================================================================

/// Process-wide state shared by every handler.
#[derive(Debug)]
pub struct AppContext {
    db: DynamicDatabase,
    // Serializes initial admin creation
    admin_lock: Mutex<()>,
}

impl AppContext {
    /// Builds the context around a setup store. No connection is opened.
    pub fn new(store: SetupConfigStore, settings: PoolSettings) -> Self {
        AppContext {
            db: DynamicDatabase::new(Arc::new(store), Arc::new(AppStateCell::new()), settings),
            admin_lock: Mutex::new(()),
        }
    }

    /// Builds the context from server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            SetupConfigStore::new(&config.setup_config_path),
            config.pool_settings(),
        )
    }

    pub fn db(&self) -> &DynamicDatabase {
        &self.db
    }

    pub fn store(&self) -> &SetupConfigStore {
        self.db.store()
    }

    pub fn state(&self) -> &AppStateCell {
        self.db.state()
    }

    pub(crate) fn admin_lock(&self) -> &Mutex<()> {
        &self.admin_lock
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the full HTTP router.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let business = admission::gated(
        Router::new()
            .merge(routes::category::router())
            .merge(routes::settings::router())
            .merge(routes::unavailable::router()),
        ctx.clone(),
        Admission::READY,
    );

    let first_run = admission::gated_first_run(
        routes::users::router(),
        ctx.clone(),
        Admission::READY_OR_SETUP,
    );

    Router::new()
        .merge(routes::setup::router())
        .route("/health", get(routes::health::health))
        .merge(business)
        .merge(first_run)
        .with_state(ctx)
}

// =============================================================================
// Router Tests
// =============================================================================
