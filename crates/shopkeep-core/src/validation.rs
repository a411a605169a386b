//! # Validation Module
//!
//! Validation of setup wizard payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (setup wizard forms)                                │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules, before any state is touched             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                     │
//! │  └── UNIQUE / NOT NULL constraints                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopkeep_core::types::DatabaseConfig;
//! use shopkeep_core::validation::validate_database_config;
//!
//! let config = DatabaseConfig::postgres("localhost", 5432, "u", "p", "d");
//! assert!(validate_database_config(&config).is_ok());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{AdminAccount, DatabaseConfig, DatabaseType, NewCategory, ShopInfo};
use crate::MIN_PASSWORD_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Helpers
// =============================================================================

fn require(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    require(field, email, 254)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must be of the form name@domain"));
    }

    match domain.find('.') {
        Some(pos) if pos > 0 && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid("domain must contain a dot")),
    }
}

// =============================================================================
// Database Step
// =============================================================================

/// Validates the database step payload.
///
/// ## Rules
/// ```text
/// ┌──────────┬──────────────────────────────────────────────────────────────┐
/// │ type     │ requirements                                                 │
/// ├──────────┼──────────────────────────────────────────────────────────────┤
/// │ postgres │ host, port 1-65535, username, database                       │
/// │ sqlite   │ database (file path or :memory:)                             │
/// │ mysql    │ rejected: UnsupportedDatabase (no driver in this build)      │
/// └──────────┴──────────────────────────────────────────────────────────────┘
/// tablePrefix must be absent or empty for every type.
/// ```
pub fn validate_database_config(config: &DatabaseConfig) -> CoreResult<()> {
    if let Some(prefix) = config.table_prefix.as_deref() {
        if !prefix.trim().is_empty() {
            return Err(CoreError::UnsupportedDatabase(
                "table prefixes are not supported".to_string(),
            ));
        }
    }

    if !config.db_type.is_supported() {
        return Err(CoreError::UnsupportedDatabase(config.db_type.to_string()));
    }

    if config.db_type == DatabaseType::Postgres {
        require("host", &config.host, 255)?;
        if config.port == 0 || config.port > u16::MAX as u32 {
            return Err(ValidationError::OutOfRange {
                field: "port".to_string(),
                min: 1,
                max: u16::MAX as i64,
            }
            .into());
        }
        require("username", &config.username, 63)?;
        require("database", &config.database, 63)?;
    } else {
        // SQLite: a file path or :memory:
        require("database", &config.database, 4096)?;
    }

    Ok(())
}

// =============================================================================
// Shop Step
// =============================================================================

/// Validates the shop step payload.
pub fn validate_shop_info(shop: &ShopInfo) -> ValidationResult<()> {
    require("name", &shop.name, 100)?;
    require("address", &shop.address, 255)?;
    require("phone", &shop.phone, 32)?;
    validate_email("email", &shop.email)?;

    let currency = shop.currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a 3-letter ISO 4217 code such as USD".to_string(),
        });
    }

    if let Some(website) = shop.website.as_deref() {
        let website = website.trim();
        if !website.is_empty()
            && !website.starts_with("http://")
            && !website.starts_with("https://")
        {
            return Err(ValidationError::InvalidFormat {
                field: "website".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
    }

    if let Some(rate) = shop.tax_rate {
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(ValidationError::OutOfRange {
                field: "taxRate".to_string(),
                min: 0,
                max: 100,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Admin Step
// =============================================================================

/// Validates the initial admin account.
///
/// ## Rules
/// - username: 3-50 chars, letters, digits, `.`, `_`, `-`
/// - email: see [`validate_email`]
/// - password: at least [`MIN_PASSWORD_LENGTH`] characters
pub fn validate_admin_account(account: &AdminAccount) -> ValidationResult<()> {
    let username = account.username.trim();
    require("username", username, 50)?;
    if username.chars().count() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '.', '_' and '-'".to_string(),
        });
    }

    validate_email("email", &account.email)?;

    if account.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Category
// =============================================================================

/// Validates a new category.
pub fn validate_new_category(category: &NewCategory) -> ValidationResult<()> {
    require("name", &category.name, 100)?;
    if let Some(description) = category.description.as_deref() {
        if description.chars().count() > 500 {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: 500,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BusinessType;

    fn shop() -> ShopInfo {
        ShopInfo {
            name: "Corner Store".to_string(),
            address: "1 Market Street".to_string(),
            phone: "555-0100".to_string(),
            email: "owner@corner.example".to_string(),
            currency: "USD".to_string(),
            business_type: BusinessType::Grocery,
            website: Some("https://corner.example".to_string()),
            tax_rate: Some(8.25),
        }
    }

    fn admin() -> AdminAccount {
        AdminAccount {
            username: "admin".to_string(),
            email: "admin@corner.example".to_string(),
            password: "correct horse".to_string(),
            full_name: None,
        }
    }

    #[test]
    fn test_validate_postgres_config() {
        let ok = DatabaseConfig::postgres("localhost", 5432, "u", "p", "d");
        assert!(validate_database_config(&ok).is_ok());

        let mut no_host = ok.clone();
        no_host.host = "  ".to_string();
        assert!(matches!(
            validate_database_config(&no_host),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let mut bad_port = ok.clone();
        bad_port.port = 70000;
        assert!(validate_database_config(&bad_port).is_err());

        bad_port.port = 0;
        assert!(validate_database_config(&bad_port).is_err());
    }

    #[test]
    fn test_validate_sqlite_config() {
        assert!(validate_database_config(&DatabaseConfig::sqlite("/var/lib/shop.db")).is_ok());
        assert!(validate_database_config(&DatabaseConfig::sqlite("")).is_err());
    }

    #[test]
    fn test_mysql_fails_closed() {
        let mut config = DatabaseConfig::postgres("localhost", 3306, "u", "p", "d");
        config.db_type = DatabaseType::Mysql;
        assert!(matches!(
            validate_database_config(&config),
            Err(CoreError::UnsupportedDatabase(_))
        ));
    }

    #[test]
    fn test_table_prefix_rejected() {
        let mut config = DatabaseConfig::sqlite("shop.db");
        config.table_prefix = Some(String::new());
        assert!(validate_database_config(&config).is_ok());

        config.table_prefix = Some("pos_".to_string());
        assert!(matches!(
            validate_database_config(&config),
            Err(CoreError::UnsupportedDatabase(_))
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "a@b.co").is_ok());
        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "no-at-sign").is_err());
        assert!(validate_email("email", "@b.co").is_err());
        assert!(validate_email("email", "a@b@c.co").is_err());
        assert!(validate_email("email", "a@localhost").is_err());
        assert!(validate_email("email", "a b@c.co").is_err());
    }

    #[test]
    fn test_validate_shop_info() {
        assert!(validate_shop_info(&shop()).is_ok());

        let mut bad = shop();
        bad.currency = "usd".to_string();
        assert!(validate_shop_info(&bad).is_err());

        let mut bad = shop();
        bad.tax_rate = Some(120.0);
        assert!(validate_shop_info(&bad).is_err());

        let mut bad = shop();
        bad.website = Some("corner.example".to_string());
        assert!(validate_shop_info(&bad).is_err());

        let mut bad = shop();
        bad.name = String::new();
        assert!(validate_shop_info(&bad).is_err());
    }

    #[test]
    fn test_validate_admin_account() {
        assert!(validate_admin_account(&admin()).is_ok());

        let mut bad = admin();
        bad.password = "short".to_string();
        assert!(matches!(
            validate_admin_account(&bad),
            Err(ValidationError::TooShort { .. })
        ));

        let mut bad = admin();
        bad.username = "ad min".to_string();
        assert!(validate_admin_account(&bad).is_err());

        let mut bad = admin();
        bad.username = "ab".to_string();
        assert!(validate_admin_account(&bad).is_err());
    }

    #[test]
    fn test_validate_new_category() {
        let ok = NewCategory {
            name: "Beverages".to_string(),
            description: None,
        };
        assert!(validate_new_category(&ok).is_ok());

        let bad = NewCategory {
            name: " ".to_string(),
            description: None,
        };
        assert!(validate_new_category(&bad).is_err());
    }
}
