//! # Route Admission
//!
//! One parameterized gate decides whether a request may reach a handler.
//! Each router declares the set of states it accepts; the gate only reads
//! the current [`AppStatus`] and never changes it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request ──► admit(current, Admission::READY) ──┬── Ok  ──► handler     │
//! │                                                 └── Err ──► 503         │
//! │                                                   "complete setup"      │
//! │                                                                         │
//! │  Admission::READY           READY                  business routes      │
//! │  Admission::SETUP_REQUIRED  SETUP_REQUIRED         setup-only routes    │
//! │  Admission::READY_OR_SETUP  READY, SETUP_REQUIRED  first-run routes     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::state::{AppStatus, StatusKind};

/// The set of states a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    allowed: &'static [StatusKind],
}

impl Admission {
    /// Business routes: only with a live database.
    pub const READY: Admission = Admission {
        allowed: &[StatusKind::Ready],
    };

    /// Routes that only make sense before the database is configured.
    pub const SETUP_REQUIRED: Admission = Admission {
        allowed: &[StatusKind::SetupRequired],
    };

    /// First-run routes that must stay reachable during setup.
    pub const READY_OR_SETUP: Admission = Admission {
        allowed: &[StatusKind::Ready, StatusKind::SetupRequired],
    };

    /// Builds a custom admission set.
    pub const fn new(allowed: &'static [StatusKind]) -> Self {
        Admission { allowed }
    }

    /// The accepted states.
    pub fn allowed(&self) -> &'static [StatusKind] {
        self.allowed
    }

    /// Returns true if a request may pass in `status`.
    pub fn admits(&self, status: &AppStatus) -> bool {
        self.allowed.contains(&status.kind())
    }
}

impl std::fmt::Display for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.allowed.iter().map(|k| k.as_str()).collect();
        f.write_str(&names.join(" or "))
    }
}

/// Admits or rejects a request.
///
/// ## Example
/// ```rust
/// use shopkeep_core::admission::{admit, Admission};
/// use shopkeep_core::state::AppStatus;
///
/// assert!(admit(&AppStatus::SetupRequired, Admission::READY_OR_SETUP).is_ok());
/// assert!(admit(&AppStatus::Initializing, Admission::READY_OR_SETUP).is_err());
/// ```
pub fn admit(status: &AppStatus, admission: Admission) -> CoreResult<()> {
    if admission.admits(status) {
        Ok(())
    } else {
        Err(CoreError::AdmissionDenied {
            required: admission,
            current: status.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> Vec<AppStatus> {
        vec![
            AppStatus::Initializing,
            AppStatus::SetupRequired,
            AppStatus::Ready,
            AppStatus::error("down"),
        ]
    }

    #[test]
    fn test_ready_gate() {
        for status in all_states() {
            assert_eq!(
                admit(&status, Admission::READY).is_ok(),
                status.is_ready(),
                "{status}"
            );
        }
    }

    #[test]
    fn test_setup_required_gate() {
        for status in all_states() {
            assert_eq!(
                admit(&status, Admission::SETUP_REQUIRED).is_ok(),
                status.is_setup_required(),
                "{status}"
            );
        }
    }

    #[test]
    fn test_ready_or_setup_gate() {
        assert!(admit(&AppStatus::Ready, Admission::READY_OR_SETUP).is_ok());
        assert!(admit(&AppStatus::SetupRequired, Admission::READY_OR_SETUP).is_ok());
        assert!(admit(&AppStatus::Initializing, Admission::READY_OR_SETUP).is_err());
        assert!(admit(&AppStatus::error("x"), Admission::READY_OR_SETUP).is_err());
    }

    #[test]
    fn test_denial_names_both_states() {
        let err = admit(&AppStatus::SetupRequired, Admission::READY).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Application is SETUP_REQUIRED; this route requires READY"
        );

        let err = admit(&AppStatus::error("x"), Admission::READY_OR_SETUP).unwrap_err();
        assert!(err.to_string().ends_with("READY or SETUP_REQUIRED"));
    }
}
