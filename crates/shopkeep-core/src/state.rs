//! # Application State
//!
//! The bootstrap state machine that decides which routes are reachable.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       AppStatus State Machine                           │
//! │                                                                         │
//! │                      ┌──────────────┐                                   │
//! │                      │ INITIALIZING │                                   │
//! │                      └──────┬───────┘                                   │
//! │         no db config        │ db config found                           │
//! │        ┌────────────────────┼─────────────────────┐                     │
//! │        ▼                    │ connect ok          ▼ connect fails       │
//! │  ┌────────────────┐         ▼               ┌───────────┐               │
//! │  │ SETUP_REQUIRED │───► ┌────────┐ ◄──────► │   ERROR   │               │
//! │  └────────────────┘     │ READY  │ reconfig │ (message) │               │
//! │        │ wizard fails   └────────┘          └───────────┘               │
//! │        └───────────────────────────────────────► ▲                      │
//! │                                                                         │
//! │  READY and ERROR are not terminal: a new configuration attempt moves   │
//! │  between them. Nothing ever returns to INITIALIZING.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::SetupConfig;

/// Current bootstrap state. Only `Error` carries a diagnostic message.
///
/// ## Serialization
/// ```json
/// { "state": "READY" }
/// { "state": "ERROR", "message": "Connection failed: ..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "state", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AppStatus {
    /// Process started, boot-time initialization not finished yet.
    #[default]
    Initializing,

    /// No database configured; only the setup API is useful.
    SetupRequired,

    /// A live database connection exists.
    Ready,

    /// The last connection attempt failed.
    Error(String),
}

/// Payload-free discriminant of [`AppStatus`], used by admission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Initializing,
    SetupRequired,
    Ready,
    Error,
}

impl StatusKind {
    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Initializing => "INITIALIZING",
            StatusKind::SetupRequired => "SETUP_REQUIRED",
            StatusKind::Ready => "READY",
            StatusKind::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppStatus {
    /// Builds the error state from any displayable failure.
    pub fn error(message: impl Into<String>) -> Self {
        AppStatus::Error(message.into())
    }

    /// Returns the discriminant.
    pub fn kind(&self) -> StatusKind {
        match self {
            AppStatus::Initializing => StatusKind::Initializing,
            AppStatus::SetupRequired => StatusKind::SetupRequired,
            AppStatus::Ready => StatusKind::Ready,
            AppStatus::Error(_) => StatusKind::Error,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AppStatus::Ready)
    }

    pub fn is_setup_required(&self) -> bool {
        matches!(self, AppStatus::SetupRequired)
    }

    /// The diagnostic message, present only in the error state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            AppStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns true if moving from `self` to `next` is a documented edge.
    ///
    /// Re-entering the same state is allowed (a repeated boot or a repeated
    /// failed attempt). `SETUP_REQUIRED` may be re-entered from `READY` or
    /// `ERROR` when the configuration is removed out of band.
    pub fn can_transition_to(&self, next: &AppStatus) -> bool {
        use StatusKind::*;
        match (self.kind(), next.kind()) {
            (Initializing, _) => true,
            (_, Initializing) => false,
            (SetupRequired, SetupRequired | Ready | Error) => true,
            (Ready, Ready | Error | SetupRequired) => true,
            (Error, Ready | Error | SetupRequired) => true,
        }
    }

    /// Re-derives the state from the persisted setup document.
    ///
    /// ## Rules
    /// - no database configuration → `SETUP_REQUIRED`
    /// - configuration + live connection → `READY`
    /// - configuration, no connection → keep `INITIALIZING` (boot still
    ///   running) or `ERROR` (keeps the last message); otherwise `ERROR`
    pub fn derive(config: &SetupConfig, connected: bool, current: &AppStatus) -> AppStatus {
        if config.database().is_none() {
            return AppStatus::SetupRequired;
        }
        if connected {
            return AppStatus::Ready;
        }
        match current {
            AppStatus::Initializing | AppStatus::Error(_) => current.clone(),
            _ => AppStatus::error("Database is configured but no connection is open"),
        }
    }
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind().as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatabaseConfig;

    fn configured() -> SetupConfig {
        let mut config = SetupConfig::default();
        config.record_database(DatabaseConfig::sqlite("shop.db"));
        config
    }

    #[test]
    fn test_only_error_carries_message() {
        assert_eq!(AppStatus::Ready.error_message(), None);
        assert_eq!(AppStatus::SetupRequired.error_message(), None);
        assert_eq!(AppStatus::error("boom").error_message(), Some("boom"));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(AppStatus::SetupRequired).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "SETUP_REQUIRED" }));

        let json = serde_json::to_value(AppStatus::error("bad password")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "state": "ERROR", "message": "bad password" })
        );
    }

    #[test]
    fn test_documented_transitions() {
        let init = AppStatus::Initializing;
        assert!(init.can_transition_to(&AppStatus::SetupRequired));
        assert!(init.can_transition_to(&AppStatus::Ready));
        assert!(init.can_transition_to(&AppStatus::error("x")));

        assert!(AppStatus::SetupRequired.can_transition_to(&AppStatus::Ready));
        assert!(AppStatus::SetupRequired.can_transition_to(&AppStatus::error("x")));
        assert!(AppStatus::Ready.can_transition_to(&AppStatus::error("x")));
        assert!(AppStatus::error("x").can_transition_to(&AppStatus::Ready));
    }

    #[test]
    fn test_nothing_returns_to_initializing() {
        for status in [
            AppStatus::SetupRequired,
            AppStatus::Ready,
            AppStatus::error("x"),
        ] {
            assert!(!status.can_transition_to(&AppStatus::Initializing));
        }
    }

    #[test]
    fn test_derive_without_database_is_setup_required() {
        let config = SetupConfig::default();
        assert_eq!(
            AppStatus::derive(&config, false, &AppStatus::Initializing),
            AppStatus::SetupRequired
        );
        assert_eq!(
            AppStatus::derive(&config, true, &AppStatus::Ready),
            AppStatus::SetupRequired
        );
    }

    #[test]
    fn test_derive_with_connection_is_ready() {
        assert_eq!(
            AppStatus::derive(&configured(), true, &AppStatus::error("old")),
            AppStatus::Ready
        );
    }

    #[test]
    fn test_derive_keeps_error_message() {
        let current = AppStatus::error("auth failed");
        assert_eq!(AppStatus::derive(&configured(), false, &current), current);

        let lost = AppStatus::derive(&configured(), false, &AppStatus::Ready);
        assert_eq!(lost.kind(), StatusKind::Error);
    }
}
