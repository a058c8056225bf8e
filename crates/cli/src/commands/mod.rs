//! Command implementations.
//!
//! Each command builds the view-model for its screen, drives it against the
//! API, and renders the resulting state. View failures are printed to stderr
//! and reported as [`CliError::Reported`] so `main` exits non-zero without
//! repeating them.

pub mod admin;
pub mod auth;
pub mod tasks;

use std::io::{self, Write};
use std::sync::Arc;

use taskmanager_client::views::{AdminDashboard, AdminTab, TaskBoard};
use taskmanager_client::{
    ApiClient, ApiError, ClientConfig, ConfigError, FileTokenStorage, Outcome, Screen,
    SessionStore, StorageError, ViewHandle,
};
use thiserror::Error;
use tracing::debug;

use crate::{prompt, render};

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),

    /// Already shown to the user.
    #[error("command failed")]
    Reported,
}

/// Shared state for one command invocation.
pub struct Context {
    pub api: ApiClient,
}

impl Context {
    /// Load configuration and restore the saved session.
    pub fn from_env() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        debug!(api_url = %config.api_url, session_file = %config.session_file.display(), "Loaded config");

        let storage = FileTokenStorage::new(&config.session_file);
        let session = Arc::new(SessionStore::init(storage));
        let api = ApiClient::new(&config, session)?;
        Ok(Self { api })
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Fail unless a token is held.
    pub async fn require_login(&self) -> Result<(), CliError> {
        if self.session().is_authenticated().await {
            Ok(())
        } else {
            Err(fail("Not logged in. Run `tm login <username>` first."))
        }
    }
}

/// Print `message` to stderr and return [`CliError::Reported`].
pub fn fail(message: &str) -> CliError {
    let _ = writeln!(io::stderr().lock(), "✗ {message}");
    CliError::Reported
}

/// Turn a view outcome into a command result.
///
/// `message` is the error or notice the view recorded. A declined
/// confirmation is not an error and yields `Ok(None)`.
pub fn settle<T>(outcome: Outcome<T>, message: Option<&str>) -> Result<Option<T>, CliError> {
    match outcome {
        Outcome::Completed(value) => Ok(Some(value)),
        Outcome::Cancelled => {
            writeln!(io::stdout().lock(), "Cancelled.")?;
            Ok(None)
        }
        Outcome::Failed(e) => {
            debug!(error = %e, "Request failed");
            let shown = message.map_or_else(|| e.to_string(), str::to_string);
            if e.status() == Some(401) {
                let _ = writeln!(
                    io::stderr().lock(),
                    "✗ {shown}\n  The server rejected the session; run `tm login` again."
                );
                return Err(CliError::Reported);
            }
            Err(fail(&shown))
        }
        Outcome::Rejected | Outcome::Ignored | Outcome::Discarded => {
            Err(message.map_or(CliError::Reported, fail))
        }
    }
}

/// Open the screen that matches the session.
pub async fn dashboard(ctx: &Context, tab: AdminTab) -> Result<(), CliError> {
    let session = ctx.session().snapshot().await;
    let welcome = session.user.as_ref().map_or_else(
        || "Welcome!".to_string(),
        |user| format!("Welcome, {}!", user.username),
    );

    match Screen::resolve(&session) {
        Screen::Login => Err(fail("Not logged in. Run `tm login <username>` first.")),
        Screen::Dashboard => {
            let mut board = TaskBoard::new(ViewHandle::new());
            let outcome = prompt::with_spinner("Loading tasks...", board.refresh(&ctx.api)).await;
            let notice = board.take_notice();
            settle(outcome, notice.as_ref().map(|n| n.message()))?;

            let mut out = io::stdout().lock();
            render::header(&mut out, "Task Manager Dashboard")?;
            writeln!(out, "{welcome}")?;
            writeln!(out)?;
            render::task_list(&mut out, board.tasks().as_slice())?;
            Ok(())
        }
        Screen::AdminDashboard => {
            let mut console = AdminDashboard::new(ViewHandle::new());
            console.select(tab);
            admin::render_console(ctx, &mut console, &welcome).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_completed() {
        let result = settle(Outcome::Completed(5), None);
        assert!(matches!(result, Ok(Some(5))));
    }

    #[test]
    fn test_settle_rejected_is_error() {
        let result = settle::<()>(Outcome::Rejected, Some("Title is required"));
        assert!(matches!(result, Err(CliError::Reported)));
    }

    #[test]
    fn test_settle_failed_is_error() {
        let outcome = Outcome::<()>::Failed(ApiError::Validation("Nothing to update".to_string()));
        assert!(matches!(settle(outcome, None), Err(CliError::Reported)));
    }
}
