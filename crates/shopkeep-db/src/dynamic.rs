//! # Dynamic Connection Manager
//!
//! Owns the one live [`Database`] handle and opens it at runtime, either at
//! boot from the persisted setup document or from the setup wizard.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    DynamicDatabase                                      │
//! │                                                                         │
//! │  boot ──► initialize_if_configured()                                   │
//! │              ├── no db config      ──► SETUP_REQUIRED                  │
//! │              ├── open + migrate ok ──► READY                           │
//! │              └── failure           ──► ERROR(message)   (never panics) │
//! │                                                                         │
//! │  POST /setup/database ──► configure_and_initialize(cfg)                │
//! │              validate ─► close old ─► open + migrate ─► persist ─► READY│
//! │              any failure ──► ERROR(message), no handle, Err returned   │
//! │                                                                         │
//! │  request ──► ensure_ready() ──► connection()                           │
//! │              no handle? one shared retry of initialize_if_configured   │
//! │              (none after a failed reconfiguration: old config stays   │
//! │              closed until a new configure_and_initialize succeeds)     │
//! │                                                                         │
//! │  ┌──────────────┐   init_lock (tokio Mutex): one writer at a time      │
//! │  │ handle       │   generation: completed attempts, lets waiters       │
//! │  │ Option<Live> │   reuse the attempt they queued behind               │
//! │  └──────────────┘                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::app_state::AppStateCell;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::pool::{Database, PoolSettings};
use crate::setup_store::SetupConfigStore;
use shopkeep_core::validation::validate_database_config;
use shopkeep_core::{AppStatus, DatabaseConfig};

/// The live handle together with the configuration it was opened from.
#[derive(Debug, Clone)]
struct Live {
    db: Database,
    config: DatabaseConfig,
}

/// Runtime-reconfigurable database handle.
///
/// ## Usage
/// ```rust,ignore
/// let manager = DynamicDatabase::new(store, state, PoolSettings::default());
/// manager.initialize_if_configured().await;
///
/// // In a handler
/// manager.ensure_ready().await?;
/// let categories = manager.connection()?.categories().list().await?;
/// ```
#[derive(Debug)]
pub struct DynamicDatabase {
    store: Arc<SetupConfigStore>,
    state: Arc<AppStateCell>,
    settings: PoolSettings,
    // Never held across an await
    handle: RwLock<Option<Live>>,
    init_lock: Mutex<()>,
    generation: AtomicU64,
    // Set while ERROR comes from a failed configure_and_initialize
    reconfigure_failed: AtomicBool,
}

impl DynamicDatabase {
    pub fn new(
        store: Arc<SetupConfigStore>,
        state: Arc<AppStateCell>,
        settings: PoolSettings,
    ) -> Self {
        DynamicDatabase {
            store,
            state,
            settings,
            handle: RwLock::new(None),
            init_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            reconfigure_failed: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<SetupConfigStore> {
        &self.store
    }

    pub fn state(&self) -> &Arc<AppStateCell> {
        &self.state
    }

    /// Number of initialization attempts that have finished.
    pub fn attempts(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Boot Path
    // =========================================================================

    /// Opens the persisted configuration, if any.
    ///
    /// Never returns an error: every outcome is reflected in the
    /// application state. Calling it again with an unchanged configuration
    /// and a healthy handle keeps that handle.
    pub async fn initialize_if_configured(&self) {
        let _guard = self.init_lock.lock().await;
        if self.reconfigure_failed.load(Ordering::SeqCst) {
            debug!("Last reconfiguration failed; waiting for a new configuration");
        } else {
            self.initialize_locked().await;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    async fn initialize_locked(&self) {
        let setup = self.store.read().await;

        let Some(config) = setup.database().cloned() else {
            info!("No database configured; waiting for setup");
            self.close_current().await;
            self.state.set_state(AppStatus::SetupRequired);
            return;
        };

        if let Err(e) = validate_database_config(&config) {
            error!(error = %e, "Persisted database configuration is invalid");
            self.close_current().await;
            self.state.set_state(AppStatus::error(e.to_string()));
            return;
        }

        if let Some(live) = self.current() {
            if live.config == config && live.db.health_check().await {
                debug!("Existing connection still healthy");
                self.state.set_state(AppStatus::Ready);
                return;
            }
        }

        self.close_current().await;

        match Database::open(&config, &self.settings).await {
            Ok(db) => {
                self.install(db, config);
                self.state.set_state(AppStatus::Ready);
            }
            Err(e) => {
                error!(database = %config.display_target(), error = %e, "Database initialization failed");
                self.state.set_state(AppStatus::error(e.to_string()));
            }
        }
    }

    // =========================================================================
    // Setup Path
    // =========================================================================

    /// Validates, opens and persists a new database configuration.
    ///
    /// Invalid or unsupported input is rejected before anything changes.
    /// Once validation passes, any previous handle is closed first; on
    /// failure the state becomes `ERROR` and no handle remains. The config
    /// is persisted only after the connection and migrations succeed.
    pub async fn configure_and_initialize(&self, config: DatabaseConfig) -> DbResult<()> {
        validate_database_config(&config)?;

        let _guard = self.init_lock.lock().await;
        info!(database = %config.display_target(), "Configuring database");

        self.close_current().await;

        let result = self.open_and_persist(&config).await;
        self.generation.fetch_add(1, Ordering::SeqCst);

        match result {
            Ok(db) => {
                self.install(db, config);
                self.reconfigure_failed.store(false, Ordering::SeqCst);
                self.state.set_state(AppStatus::Ready);
                Ok(())
            }
            Err(e) => {
                error!(database = %config.display_target(), error = %e, "Database configuration failed");
                self.reconfigure_failed.store(true, Ordering::SeqCst);
                self.state.set_state(AppStatus::error(e.to_string()));
                Err(e)
            }
        }
    }

    async fn open_and_persist(&self, config: &DatabaseConfig) -> DbResult<Database> {
        let db = Database::open(config, &self.settings).await?;

        let persisted = self
            .store
            .update(|setup| {
                setup.record_database(config.clone());
                Ok(())
            })
            .await;

        if let Err(e) = persisted {
            db.close().await;
            return Err(e);
        }

        Ok(db)
    }

    // =========================================================================
    // Request Path
    // =========================================================================

    /// The live handle, or `NotInitialized`.
    pub fn connection(&self) -> DbResult<Database> {
        self.current()
            .map(|live| live.db)
            .ok_or(DbError::NotInitialized)
    }

    /// Makes sure a handle exists, retrying initialization once if not.
    ///
    /// Concurrent callers that find no handle share a single retry: whoever
    /// takes the lock first runs it; the rest see the generation moved and
    /// reuse its outcome.
    ///
    /// No retry happens after a failed `configure_and_initialize`: the
    /// persisted config is the one being replaced, so the manager stays
    /// without a connection until a reconfiguration succeeds.
    pub async fn ensure_ready(&self) -> DbResult<()> {
        if self.current().is_some() {
            return Ok(());
        }

        let observed = self.generation.load(Ordering::SeqCst);
        {
            let _guard = self.init_lock.lock().await;
            if self.reconfigure_failed.load(Ordering::SeqCst) {
                debug!("Last reconfiguration failed; not reopening the previous database");
            } else if self.generation.load(Ordering::SeqCst) == observed
                && self.current().is_none()
            {
                warn!("No database connection; retrying initialization");
                self.initialize_locked().await;
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
        }

        self.connection().map(|_| ())
    }

    /// Re-derives the application state from the store and the handle.
    pub async fn refresh_state(&self) -> AppStatus {
        let setup = self.store.read().await;
        self.state.refresh(&setup, self.current().is_some())
    }

    /// Runs `SELECT 1` against the live handle.
    pub async fn health_check(&self) -> bool {
        match self.current() {
            Some(live) => live.db.health_check().await,
            None => false,
        }
    }

    /// Embedded and applied migration counts of the live handle.
    pub async fn migration_status(&self) -> Option<(usize, usize)> {
        let live = self.current()?;
        match migrations::migration_status(&live.db).await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, "Cannot read migration status");
                None
            }
        }
    }

    /// Closes the live handle. Used on process shutdown.
    pub async fn shutdown(&self) {
        let _guard = self.init_lock.lock().await;
        self.close_current().await;
        info!("Database manager shut down");
    }

    // =========================================================================
    // Handle Slot
    // =========================================================================

    fn current(&self) -> Option<Live> {
        match self.handle.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn install(&self, db: Database, config: DatabaseConfig) {
        let live = Live { db, config };
        match self.handle.write() {
            Ok(mut slot) => *slot = Some(live),
            Err(poisoned) => *poisoned.into_inner() = Some(live),
        }
    }

    async fn close_current(&self) {
        let previous = match self.handle.write() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(live) = previous {
            debug!(database = %live.config.display_target(), "Closing previous connection");
            live.db.close().await;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
