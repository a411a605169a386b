//! # Domain Types
//!
//! The setup config document and the payloads of the setup wizard.
//!
//! ## Document Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       setup-config.json                                 │
//! │                                                                         │
//! │  ┌─────────────────────────┐                                            │
//! │  │      SetupConfig        │                                            │
//! │  │  ─────────────────────  │    ┌─────────────────┐                     │
//! │  │  isDatabaseConfigured ──┼───►│ DatabaseConfig  │ type, host, port,   │
//! │  │  isShopConfigured ──────┼─┐  └─────────────────┘ credentials, ssl    │
//! │  │  isAdminUserCreated     │ │  ┌─────────────────┐                     │
//! │  │  isSetupComplete        │ └─►│    ShopInfo     │ name, address,      │
//! │  └─────────────────────────┘    └─────────────────┘ currency, ...       │
//! │                                                                         │
//! │  isSetupComplete ⇒ isDatabaseConfigured ∧ isShopConfigured             │
//! │                    ∧ isAdminUserCreated                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All JSON keys are camelCase to match the frontend.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Setup Steps
// =============================================================================

/// One prerequisite step of the setup wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SetupStep {
    Database,
    Shop,
    Admin,
}

impl std::fmt::Display for SetupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupStep::Database => write!(f, "database"),
            SetupStep::Shop => write!(f, "shop"),
            SetupStep::Admin => write!(f, "admin"),
        }
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

/// Database backends a setup payload may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DatabaseType {
    /// PostgreSQL, the primary production backend.
    #[serde(alias = "postgresql")]
    Postgres,

    /// SQLite file database (single-machine installs).
    Sqlite,

    /// Accepted on the wire, rejected by validation: no driver is built in.
    #[serde(alias = "mariadb")]
    Mysql,
}

impl DatabaseType {
    /// Returns true if this build can open a live connection of this type.
    pub fn is_supported(&self) -> bool {
        matches!(self, DatabaseType::Postgres | DatabaseType::Sqlite)
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::Postgres => write!(f, "postgres"),
            DatabaseType::Sqlite => write!(f, "sqlite"),
            DatabaseType::Mysql => write!(f, "mysql"),
        }
    }
}

/// Connection parameters collected by the database step.
///
/// For `sqlite`, `database` is the file path and the network fields are
/// ignored. The password is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: DatabaseType,

    #[serde(default)]
    pub host: String,

    /// Kept wider than `u16` so out-of-range values surface as validation
    /// errors instead of parse errors.
    #[serde(default)]
    pub port: u32,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub ssl: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub table_prefix: Option<String>,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .field("table_prefix", &self.table_prefix)
            .finish()
    }
}

impl DatabaseConfig {
    /// Creates a SQLite configuration for the given file path.
    pub fn sqlite(path: impl Into<String>) -> Self {
        DatabaseConfig {
            db_type: DatabaseType::Sqlite,
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            database: path.into(),
            ssl: false,
            table_prefix: None,
        }
    }

    /// Creates a PostgreSQL configuration.
    pub fn postgres(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        DatabaseConfig {
            db_type: DatabaseType::Postgres,
            host: host.into(),
            port: port.into(),
            username: username.into(),
            password: password.into(),
            database: database.into(),
            ssl: false,
            table_prefix: None,
        }
    }

    /// A log-safe description of the target (`postgres://u@host:5432/db`).
    pub fn display_target(&self) -> String {
        match self.db_type {
            DatabaseType::Sqlite => format!("sqlite://{}", self.database),
            _ => format!(
                "{}://{}@{}:{}/{}",
                self.db_type, self.username, self.host, self.port, self.database
            ),
        }
    }
}

// =============================================================================
// Shop Information
// =============================================================================

/// Kind of business the shop runs; drives frontend defaults only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum BusinessType {
    Retail,
    Grocery,
    Pharmacy,
    Restaurant,
    Electronics,
    Clothing,
    Other,
}

/// Shop profile collected by the shop step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShopInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,

    /// ISO 4217 code, e.g. "USD".
    pub currency: String,

    pub business_type: BusinessType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub website: Option<String>,

    /// Default sales tax in percent (8.25 = 8.25%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tax_rate: Option<f64>,
}

// =============================================================================
// Setup Config Document
// =============================================================================

/// The persisted record of setup progress.
///
/// ## Lifecycle
/// ```text
/// first boot ──► all flags false
///      │
///      ├── database step ──► isDatabaseConfigured + databaseConfig
///      ├── shop step     ──► isShopConfigured + shopInfo
///      ├── admin step    ──► isAdminUserCreated
///      └── complete      ──► isSetupComplete (only if the three above hold)
/// ```
/// Persisted after every mutation, never deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SetupConfig {
    pub is_database_configured: bool,
    pub is_shop_configured: bool,
    pub is_admin_user_created: bool,
    pub is_setup_complete: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub database_config: Option<DatabaseConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub shop_info: Option<ShopInfo>,
}

impl SetupConfig {
    /// Returns the database configuration if the database step finished.
    pub fn database(&self) -> Option<&DatabaseConfig> {
        if self.is_database_configured {
            self.database_config.as_ref()
        } else {
            None
        }
    }

    /// Steps that still block `complete`, in wizard order.
    pub fn missing_steps(&self) -> Vec<SetupStep> {
        let mut missing = Vec::new();
        if !self.is_database_configured {
            missing.push(SetupStep::Database);
        }
        if !self.is_shop_configured {
            missing.push(SetupStep::Shop);
        }
        if !self.is_admin_user_created {
            missing.push(SetupStep::Admin);
        }
        missing
    }

    /// Records a successful database step.
    pub fn record_database(&mut self, config: DatabaseConfig) {
        self.database_config = Some(config);
        self.is_database_configured = true;
    }

    /// Records a successful shop step.
    pub fn record_shop(&mut self, shop: ShopInfo) {
        self.shop_info = Some(shop);
        self.is_shop_configured = true;
    }

    /// Records that the initial admin account exists.
    pub fn record_admin_created(&mut self) {
        self.is_admin_user_created = true;
    }

    /// Marks setup complete.
    ///
    /// Fails without touching `is_setup_complete` if any step is missing.
    pub fn mark_complete(&mut self) -> CoreResult<()> {
        let missing = self.missing_steps();
        if !missing.is_empty() {
            return Err(CoreError::SetupIncomplete { missing });
        }
        self.is_setup_complete = true;
        Ok(())
    }

    /// Restores the completion invariant on a document read from disk.
    ///
    /// Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        if self.is_setup_complete && !self.missing_steps().is_empty() {
            self.is_setup_complete = false;
            changed = true;
        }
        if self.is_database_configured && self.database_config.is_none() {
            self.is_database_configured = false;
            changed = true;
        }
        changed
    }
}

// =============================================================================
// API Views
// =============================================================================

/// Body of `GET /setup/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SetupStatus {
    pub is_setup_complete: bool,
}

/// The four completion flags without payloads (safe to return publicly).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SetupProgress {
    pub is_database_configured: bool,
    pub is_shop_configured: bool,
    pub is_admin_user_created: bool,
    pub is_setup_complete: bool,
}

impl From<&SetupConfig> for SetupProgress {
    fn from(config: &SetupConfig) -> Self {
        SetupProgress {
            is_database_configured: config.is_database_configured,
            is_shop_configured: config.is_shop_configured,
            is_admin_user_created: config.is_admin_user_created,
            is_setup_complete: config.is_setup_complete,
        }
    }
}

impl From<&SetupConfig> for SetupStatus {
    fn from(config: &SetupConfig) -> Self {
        SetupStatus {
            is_setup_complete: config.is_setup_complete,
        }
    }
}

// =============================================================================
// Admin Account
// =============================================================================

/// Payload of the admin step. The password is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub full_name: Option<String>,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .finish()
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(optional)]
    pub description: Option<String>,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCategory {
    pub name: String,

    #[serde(default)]
    #[ts(optional)]
    pub description: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_shop() -> ShopInfo {
        ShopInfo {
            name: "Corner Store".to_string(),
            address: "1 Market Street".to_string(),
            phone: "+1 555 0100".to_string(),
            email: "owner@corner.example".to_string(),
            currency: "USD".to_string(),
            business_type: BusinessType::Retail,
            website: None,
            tax_rate: Some(8.25),
        }
    }

    #[test]
    fn test_default_config_is_all_false() {
        let config = SetupConfig::default();
        assert!(!config.is_database_configured);
        assert!(!config.is_shop_configured);
        assert!(!config.is_admin_user_created);
        assert!(!config.is_setup_complete);
        assert!(config.database().is_none());
    }

    #[test]
    fn test_complete_requires_all_steps() {
        let mut config = SetupConfig::default();
        config.record_database(DatabaseConfig::sqlite("shop.db"));
        config.record_shop(sample_shop());

        let err = config.mark_complete().unwrap_err();
        assert!(matches!(
            err,
            CoreError::SetupIncomplete { ref missing } if missing == &vec![SetupStep::Admin]
        ));
        assert!(!config.is_setup_complete);

        config.record_admin_created();
        config.mark_complete().unwrap();
        assert!(config.is_setup_complete);
    }

    #[test]
    fn test_complete_in_any_step_order() {
        let mut config = SetupConfig::default();
        config.record_admin_created();
        assert!(config.mark_complete().is_err());
        config.record_shop(sample_shop());
        assert!(config.mark_complete().is_err());
        config.record_database(DatabaseConfig::sqlite("shop.db"));
        assert!(config.mark_complete().is_ok());
    }

    #[test]
    fn test_normalize_clears_inconsistent_completion() {
        let mut config = SetupConfig {
            is_setup_complete: true,
            is_shop_configured: true,
            ..Default::default()
        };
        assert!(config.normalize());
        assert!(!config.is_setup_complete);

        // Flag without payload is not a usable database step
        let mut config = SetupConfig {
            is_database_configured: true,
            ..Default::default()
        };
        assert!(config.normalize());
        assert!(config.database().is_none());
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let mut config = SetupConfig::default();
        config.record_database(DatabaseConfig::postgres("localhost", 5432, "u", "p", "d"));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["isDatabaseConfigured"], true);
        assert_eq!(json["databaseConfig"]["type"], "postgres");
        assert_eq!(json["databaseConfig"]["port"], 5432);
        assert!(json.get("shopInfo").is_none());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: SetupConfig = serde_json::from_str(r#"{"isShopConfigured": true}"#).unwrap();
        assert!(config.is_shop_configured);
        assert!(!config.is_database_configured);
    }

    #[test]
    fn test_database_payload_from_wizard() {
        let config: DatabaseConfig = serde_json::from_str(
            r#"{"type":"postgres","host":"localhost","port":5432,"username":"u","password":"p","database":"d","ssl":false}"#,
        )
        .unwrap();
        assert_eq!(config.db_type, DatabaseType::Postgres);
        assert_eq!(config.display_target(), "postgres://u@localhost:5432/d");
        assert!(!format!("{:?}", config).contains("\"p\""));
    }

    #[test]
    fn test_database_type_support() {
        assert!(DatabaseType::Postgres.is_supported());
        assert!(DatabaseType::Sqlite.is_supported());
        assert!(!DatabaseType::Mysql.is_supported());
    }
}
