//! View-models for every screen of the task manager.
//!
//! Each view owns its state (form fields, cached entities, alerts) and talks
//! to the server through an [`ApiClient`](crate::api::ApiClient). Rendering
//! is left to the front end; the CLI in `taskmanager-cli` is one.
//!
//! # Conventions
//!
//! - Views are built with a [`ViewHandle`] and check it after every await.
//!   A response that arrives after [`ViewHandle::unmount`] is dropped and
//!   the call returns [`Outcome::Discarded`].
//! - Forms refuse a second submit while one is in flight
//!   ([`Outcome::Ignored`]).
//! - Destructive actions ask a [`Confirm`] first. A "no" sends nothing.
//! - Failures never escape as panics or errors that end the view; they are
//!   stored as a message or [`Notice`] and reported in the [`Outcome`].

pub mod admin;
pub mod auth;
pub mod tasks;

pub use admin::{AdminDashboard, AdminTab, AdminTaskTable, StatCell, UserTable};
pub use auth::{LoginForm, RegisterForm};
pub use tasks::{BoardState, TaskBoard, TaskForm, TaskFormMode};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::ApiError;
use crate::session::Session;

/// Top-level screen for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Login or registration.
    Login,
    /// A standard user's task board.
    Dashboard,
    /// The administrator console.
    AdminDashboard,
}

impl Screen {
    /// Pick the screen for `session`.
    ///
    /// A session restored from storage has a token but no profile; it gets
    /// the standard dashboard until the next login reveals the role.
    #[must_use]
    pub fn resolve(session: &Session) -> Self {
        if !session.is_authenticated() {
            return Self::Login;
        }
        match session.role() {
            Some(role) if role.is_admin() => Self::AdminDashboard,
            _ => Self::Dashboard,
        }
    }
}

/// Liveness token shared between a view and whoever displays it.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    mounted: Arc<AtomicBool>,
}

impl Default for ViewHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewHandle {
    /// A handle for a freshly mounted view.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the view is still displayed.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Mark the view as gone. Late responses are discarded from now on.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}

/// Asks the user to approve a destructive action.
pub trait Confirm {
    /// Return `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Approves everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// A one-shot alert raised by a view action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// The alert text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// What a view action did.
#[derive(Debug)]
pub enum Outcome<T = ()> {
    /// The server confirmed the action.
    Completed(T),
    /// Local validation failed; no request was sent.
    Rejected,
    /// The user declined the confirmation; no request was sent.
    Cancelled,
    /// A submit was already in flight; no request was sent.
    Ignored,
    /// The view was unmounted before the response arrived.
    Discarded,
    /// The request failed. The view holds the user-facing message.
    Failed(ApiError),
}

impl<T> Outcome<T> {
    /// Whether the server confirmed the action.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Whether a request was dispatched and failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Transform the confirmed value, keeping every other variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Rejected => Outcome::Rejected,
            Self::Cancelled => Outcome::Cancelled,
            Self::Ignored => Outcome::Ignored,
            Self::Discarded => Outcome::Discarded,
            Self::Failed(e) => Outcome::Failed(e),
        }
    }

    /// The confirmed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }
}
