//! `register`, `login`, `logout` and `status`.

use std::io::{self, Write};

use taskmanager_client::views::{LoginForm, RegisterForm};
use taskmanager_client::{Screen, ViewHandle};

use super::{CliError, Context, settle};
use crate::prompt;

/// Create an account. The user still has to log in afterwards.
pub async fn register(
    ctx: &Context,
    username: String,
    email: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let mut form = RegisterForm::new(ViewHandle::new());
    form.username = username;
    form.email = email;
    form.password = prompt::password(password, true)?;

    let outcome = prompt::with_spinner("Creating Account...", form.submit(&ctx.api)).await;
    let Some(message) = settle(outcome, form.error())? else {
        return Ok(());
    };

    let mut out = io::stdout().lock();
    writeln!(out, "{message}")?;
    writeln!(out, "Log in with `tm login`.")?;
    Ok(())
}

/// Log in and persist the token.
pub async fn login(
    ctx: &Context,
    username: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let mut form = LoginForm::new(ViewHandle::new());
    form.username = username;
    form.password = prompt::password(password, false)?;

    let outcome = prompt::with_spinner("Logging in...", form.submit(&ctx.api)).await;
    let Some(profile) = settle(outcome, form.error())? else {
        return Ok(());
    };

    let screen = Screen::resolve(&ctx.session().snapshot().await);
    let mut out = io::stdout().lock();
    writeln!(out, "Welcome, {}! (Role: {})", profile.username, profile.role)?;
    if screen == Screen::AdminDashboard {
        writeln!(out, "You have administrator privileges. Try `tm admin stats`.")?;
    }
    Ok(())
}

/// Forget the session, locally and on disk.
pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    let was_authenticated = ctx.session().is_authenticated().await;
    ctx.session().logout().await?;

    let mut out = io::stdout().lock();
    if was_authenticated {
        writeln!(out, "Logged out.")?;
    } else {
        writeln!(out, "Not logged in.")?;
    }
    Ok(())
}

/// Print the session state. Makes no network call.
pub async fn status(ctx: &Context) -> Result<(), CliError> {
    let session = ctx.session().snapshot().await;
    let mut out = io::stdout().lock();

    writeln!(out, "API: {}", ctx.api.base_url())?;
    match (&session.token, &session.user) {
        (None, _) => writeln!(out, "Not logged in.")?,
        (Some(_), Some(user)) => {
            writeln!(out, "Logged in as {} <{}> ({})", user.username, user.email, user.role)?;
        }
        (Some(_), None) => {
            writeln!(out, "Logged in (profile unknown until the next `tm login`).")?;
        }
    }
    Ok(())
}
