//! # HTTP Routes
//!
//! One module per route group. Each exposes `router()`; admission is applied
//! by [`crate::build_router`], never inside the handlers.
//!
//! - [`setup`] - Setup wizard (public)
//! - [`health`] - Liveness and database health (public)
//! - [`users`] - Initial admin account (READY or SETUP_REQUIRED)
//! - [`category`] - Category list/create (READY)
//! - [`settings`] - Shop settings (READY)
//! - [`unavailable`] - Business prefixes this server does not implement (READY)

pub mod category;
pub mod health;
pub mod settings;
pub mod setup;
pub mod unavailable;
pub mod users;
