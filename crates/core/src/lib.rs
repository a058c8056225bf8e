//! Task Manager Core - Shared domain types.
//!
//! This crate provides the types exchanged with the task manager REST API:
//! - `client` - API client, session store, entity caches and view-models
//! - `cli` - Terminal front end (`tm`)
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no durable storage. Validation that must happen before a request is sent
//! (blank titles, unknown roles, malformed emails) lives here so every
//! caller gets it for free.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, roles, tasks, users and statistics

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
