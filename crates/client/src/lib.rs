//! Task manager client.
//!
//! This crate holds everything a front end needs to drive the task manager
//! REST API:
//!
//! - [`session`] - the authenticated session and its durable token
//! - [`api`] - the HTTP client and its error type
//! - [`cache`] - in-memory mirrors of server collections
//! - [`views`] - view-models for the login, dashboard and admin screens
//! - [`config`] - environment-driven configuration
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use taskmanager_client::{ApiClient, ClientConfig, FileTokenStorage, SessionStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(SessionStore::init(FileTokenStorage::new(&config.session_file)));
//! let api = ApiClient::new(&config, session)?;
//! # let _ = api;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod config;
pub mod session;
pub mod views;

pub use api::{ApiClient, ApiError, LoginOutcome};
pub use cache::EntityCache;
pub use config::{ClientConfig, ConfigError};
pub use session::{FileTokenStorage, MemoryTokenStorage, Session, SessionStore, StorageError, TokenStorage};
pub use views::{Confirm, Notice, Outcome, Screen, ViewHandle};
