//! # shopkeep-db: Bootstrap I/O for Shopkeep
//!
//! Everything the bootstrap touches outside the process: the setup config
//! file and the one live database connection.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (apps/server)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopkeep-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────────┐   ┌──────────────┐   ┌───────────────┐  │   │
//! │  │  │ DynamicDatabase  │──►│   Database   │──►│  Migrations   │  │   │
//! │  │  │ (dynamic.rs)     │   │  (pool.rs)   │   │ postgres/     │  │   │
//! │  │  │ ensure_ready     │   │ PgPool |     │   │ sqlite/       │  │   │
//! │  │  │ configure        │   │ SqlitePool   │   └───────────────┘  │   │
//! │  │  └───┬──────────┬───┘   └──────┬───────┘                      │   │
//! │  │      │          │              ▼                               │   │
//! │  │      │          │       Repositories (category, user)         │   │
//! │  │      ▼          ▼                                              │   │
//! │  │  SetupConfigStore   AppStateCell                               │   │
//! │  │  (setup-config.json) (watch<AppStatus>)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`dynamic`] - Runtime-reconfigurable connection manager
//! - [`setup_store`] - JSON setup document on disk
//! - [`app_state`] - Observable application state
//! - [`pool`] - Pool creation for PostgreSQL and SQLite
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopkeep_db::{AppStateCell, DynamicDatabase, PoolSettings, SetupConfigStore};
//!
//! let store = Arc::new(SetupConfigStore::new("data/setup-config.json"));
//! let state = Arc::new(AppStateCell::new());
//! let db = DynamicDatabase::new(store, state, PoolSettings::default());
//!
//! db.initialize_if_configured().await; // SETUP_REQUIRED on first boot
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod app_state;
pub mod dynamic;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod setup_store;

// =============================================================================
// Re-exports
// =============================================================================

pub use app_state::AppStateCell;
pub use dynamic::DynamicDatabase;
pub use error::{DbError, DbResult};
pub use pool::{Database, PoolSettings};
pub use setup_store::SetupConfigStore;

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::user::{NewUser, UserRepository, ROLE_ADMIN};
