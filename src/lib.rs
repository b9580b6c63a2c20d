//! # Journal
//!
//! A multi-user journaling service: users keep journal entries, comment on
//! each other's entries, and every overwrite of an entry's content is kept in
//! an append-only edit history. Usable both as a standalone binary and as a
//! library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! journal = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use journal::auth::{PasswordVault, TokenService};
//! use journal::server::{AppState, LinkBuilder, create_router};
//! use journal::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./journal.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     PasswordVault::new(),
//!     TokenService::new(b"signing-key", chrono::Duration::minutes(15)),
//!     LinkBuilder::default(),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `journal` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
