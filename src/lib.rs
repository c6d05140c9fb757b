//! # Extgate
//!
//! An extension installation registry and request proxy gateway, usable both
//! as a standalone binary and as a library.
//!
//! A platform registers third-party extensions in a global catalog. Each
//! tenant ("business") installs an extension under a tenant-local name; the
//! gateway then resolves `/{app_name}/{path}` calls to the installation's
//! backend domain and forwards them transparently.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use extgate::config::ServerConfig;
//! use extgate::server::{AppState, create_router};
//! use extgate::store::SqliteStore;
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config).unwrap());
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod server;
pub mod store;
pub mod types;
