//! # shopkeep-core: Pure Bootstrap Model for Shopkeep
//!
//! The server starts without a database. This crate describes, without doing
//! any I/O, everything the bootstrap needs to decide what to do next.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend (setup wizard + back office)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    /setup/*  (public)      business routes (admission gate)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopkeep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   state   │  │ admission │  │ validation│  │   │
//! │  │   │SetupConfig│  │ AppStatus │  │   gate    │  │   rules   │  │   │
//! │  │   │ DbConfig  │  │transitions│  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopkeep-db (Bootstrap I/O)                     │   │
//! │  │       setup-config.json, dynamic Pg/SQLite pool, migrations     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Setup config document (`SetupConfig`, `DatabaseConfig`, `ShopInfo`)
//! - [`state`] - `AppStatus` state machine
//! - [`admission`] - Route admission gate
//! - [`validation`] - Setup payload validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shopkeep_core::admission::{admit, Admission};
//! use shopkeep_core::state::AppStatus;
//!
//! // Business routes only open once the database is up
//! assert!(admit(&AppStatus::SetupRequired, Admission::READY).is_err());
//! assert!(admit(&AppStatus::Ready, Admission::READY).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admission;
pub mod error;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use admission::{admit, Admission};
pub use error::{CoreError, CoreResult, ValidationError};
pub use state::AppStatus;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// File name of the persisted setup document.
pub const SETUP_CONFIG_FILE_NAME: &str = "setup-config.json";

/// Minimum length of the initial admin password.
pub const MIN_PASSWORD_LENGTH: usize = 8;
