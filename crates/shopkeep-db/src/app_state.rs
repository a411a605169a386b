//! # Application State Cell
//!
//! Holds the process-wide [`AppStatus`] and publishes every change on a
//! `tokio::sync::watch` channel.
//!
//! Reads are synchronous and never wait on I/O, so admission guards can
//! consult the state on every request.

use tokio::sync::watch;
use tracing::{info, warn};

use shopkeep_core::{AppStatus, SetupConfig};

/// Shared, observable application state.
#[derive(Debug)]
pub struct AppStateCell {
    tx: watch::Sender<AppStatus>,
}

impl Default for AppStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateCell {
    /// Starts in `INITIALIZING`.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppStatus::Initializing);
        AppStateCell { tx }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppStatus {
        self.tx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_ready()
    }

    pub fn is_setup_required(&self) -> bool {
        self.tx.borrow().is_setup_required()
    }

    /// Moves to `next`.
    ///
    /// Returns false, and keeps the current state, if `next` is not a
    /// documented edge from the current state.
    pub fn set_state(&self, next: AppStatus) -> bool {
        let mut applied = true;

        self.tx.send_if_modified(|current| {
            if !current.can_transition_to(&next) {
                warn!(from = %current, to = %next, "Refusing undocumented state transition");
                applied = false;
                return false;
            }
            if *current == next {
                return false;
            }

            match next.error_message() {
                Some(reason) => warn!(from = %current, reason, "Application state -> ERROR"),
                None => info!(from = %current, to = %next, "Application state changed"),
            }
            *current = next;
            true
        });

        applied
    }

    /// Re-derives the state from the persisted document and handle presence.
    pub fn refresh(&self, config: &SetupConfig, connected: bool) -> AppStatus {
        let next = AppStatus::derive(config, connected, &self.state());
        self.set_state(next);
        self.state()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AppStatus> {
        self.tx.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_core::DatabaseConfig;

    #[test]
    fn test_starts_initializing() {
        let cell = AppStateCell::new();
        assert_eq!(cell.state(), AppStatus::Initializing);
        assert!(!cell.is_ready());
        assert!(!cell.is_setup_required());
    }

    #[test]
    fn test_error_message_cleared_by_next_state() {
        let cell = AppStateCell::new();
        assert!(cell.set_state(AppStatus::error("refused")));
        assert_eq!(cell.state().error_message(), Some("refused"));

        assert!(cell.set_state(AppStatus::Ready));
        assert_eq!(cell.state(), AppStatus::Ready);
        assert_eq!(cell.state().error_message(), None);
    }

    #[test]
    fn test_never_returns_to_initializing() {
        let cell = AppStateCell::new();
        cell.set_state(AppStatus::SetupRequired);

        assert!(!cell.set_state(AppStatus::Initializing));
        assert_eq!(cell.state(), AppStatus::SetupRequired);
    }

    #[test]
    fn test_refresh_derives_from_config() {
        let cell = AppStateCell::new();
        let mut config = SetupConfig::default();

        assert_eq!(cell.refresh(&config, false), AppStatus::SetupRequired);

        config.record_database(DatabaseConfig::sqlite("shop.db"));
        assert_eq!(cell.refresh(&config, true), AppStatus::Ready);
        assert!(cell.refresh(&config, false).error_message().is_some());
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let cell = AppStateCell::new();
        let mut rx = cell.subscribe();

        cell.set_state(AppStatus::SetupRequired);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AppStatus::SetupRequired);

        // Same state again is not a change
        cell.set_state(AppStatus::SetupRequired);
        assert!(!rx.has_changed().unwrap());
    }
}
