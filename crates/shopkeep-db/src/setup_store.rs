//! # Setup Config Store
//!
//! Persists the [`SetupConfig`] document as JSON on local disk.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Atomic Write                                       │
//! │                                                                         │
//! │  update(|cfg| ...)                                                     │
//! │       │  (async mutex: one read-modify-write at a time)                │
//! │       ▼                                                                 │
//! │  read()  ──► setup-config.json  (missing/corrupt → all-false default)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  mutate in memory                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  .setup-config.json.tmp  ──rename──►  setup-config.json                │
//! │                                                                         │
//! │  Readers see either the old document or the new one, never a mix.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The file holds the database password in plain text, the same way the
//! setup wizard submitted it. Protect it with file system permissions.

use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use shopkeep_core::SetupConfig;

/// JSON-file backed store for the setup document.
#[derive(Debug)]
pub struct SetupConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SetupConfigStore {
    /// Creates a store for the document at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SetupConfigStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current document.
    ///
    /// Never fails: a missing file is a first boot, and an unreadable or
    /// unparsable file is logged and treated the same way. The completion
    /// invariant is restored on the returned copy.
    pub async fn read(&self) -> SetupConfig {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No setup config yet, using defaults");
                return SetupConfig::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read setup config, using defaults");
                return SetupConfig::default();
            }
        };

        let mut config = match serde_json::from_str::<SetupConfig>(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Setup config is not valid JSON, using defaults");
                return SetupConfig::default();
            }
        };

        if config.normalize() {
            warn!(path = %self.path.display(), "Setup config had inconsistent flags; normalized");
        }

        config
    }

    /// Replaces the document.
    pub async fn write(&self, config: &SetupConfig) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_unlocked(config).await
    }

    /// Read-modify-write under the store's lock.
    ///
    /// If `mutate` returns an error, nothing is written and the error is
    /// returned unchanged.
    ///
    /// ## Example
    /// ```rust,ignore
    /// store.update(|cfg| { cfg.record_shop(shop); Ok(()) }).await?;
    /// ```
    pub async fn update<T, F>(&self, mutate: F) -> DbResult<T>
    where
        F: FnOnce(&mut SetupConfig) -> DbResult<T>,
    {
        let _guard = self.write_lock.lock().await;

        let mut config = self.read().await;
        let result = mutate(&mut config)?;
        self.write_unlocked(&config).await?;

        Ok(result)
    }

    async fn write_unlocked(&self, config: &SetupConfig) -> DbResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(config)?;
        let tmp = self.temp_path();

        tokio::fs::write(&tmp, &body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        info!(
            path = %self.path.display(),
            database = config.is_database_configured,
            shop = config.is_shop_configured,
            admin = config.is_admin_user_created,
            complete = config.is_setup_complete,
            "Setup config saved"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| shopkeep_core::SETUP_CONFIG_FILE_NAME.to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use shopkeep_core::{BusinessType, CoreError, DatabaseConfig, ShopInfo};
    use std::sync::Arc;

    fn store_in(dir: &tempfile::TempDir) -> SetupConfigStore {
        SetupConfigStore::new(dir.path().join("setup-config.json"))
    }

    fn shop() -> ShopInfo {
        ShopInfo {
            name: "Corner Store".to_string(),
            address: "1 Market Street".to_string(),
            phone: "555-0100".to_string(),
            email: "owner@corner.example".to_string(),
            currency: "USD".to_string(),
            business_type: BusinessType::Retail,
            website: None,
            tax_rate: Some(7.5),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.read().await, SetupConfig::default());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.read().await, SetupConfig::default());
    }

    #[tokio::test]
    async fn test_round_trip_with_nested_objects() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut config = SetupConfig::default();
        config.record_database(DatabaseConfig::postgres("db.local", 5432, "shop", "pw", "shop"));
        config.record_shop(shop());
        config.record_admin_created();
        config.mark_complete().unwrap();

        store.write(&config).await.unwrap();
        assert_eq!(store.read().await, config);
    }

    #[tokio::test]
    async fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SetupConfigStore::new(dir.path().join("nested").join("setup-config.json"));

        store.write(&SetupConfig::default()).await.unwrap();
        assert!(store.path().exists());
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_on_disk_keys_are_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .update(|cfg| {
                cfg.record_database(DatabaseConfig::sqlite("/tmp/shop.db"));
                Ok(())
            })
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"isDatabaseConfigured\": true"));
        assert!(raw.contains("\"databaseConfig\""));
        assert!(raw.contains("\"type\": \"sqlite\""));
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store
            .update(|cfg| cfg.mark_complete().map_err(DbError::from))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Rejected(CoreError::SetupIncomplete { .. })
        ));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_inconsistent_file_is_normalized_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"isSetupComplete": true, "isShopConfigured": true}"#,
        )
        .unwrap();

        let config = store.read().await;
        assert!(!config.is_setup_complete);
        assert!(config.is_shop_configured);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(|cfg| {
                        cfg.record_shop(shop());
                        Ok(())
                    })
                    .await
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(|cfg| {
                        cfg.record_admin_created();
                        Ok(())
                    })
                    .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let config = store.read().await;
        assert!(config.is_shop_configured);
        assert!(config.is_admin_user_created);
    }
}
