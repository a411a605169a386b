//! # Repository Module
//!
//! Database repository implementations for Shopkeep.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  manager.ensure_ready().await?                                 │
//! │       │  manager.connection()?.categories().list()                     │
//! │       ▼                                                                 │
//! │  CategoryRepository                                                    │
//! │  ├── list(&self)                                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── create(&self, category)                                           │
//! │       │                                                                 │
//! │       │  SQL for the backend the Database enum holds                   │
//! │       ▼                                                                 │
//! │  PostgreSQL  |  SQLite                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Category list/create
//! - [`UserRepository`](user::UserRepository) - Initial admin account

pub mod category;
pub mod user;
