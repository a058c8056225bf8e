//! Administrator commands.
//!
//! # Usage
//!
//! ```bash
//! tm admin stats
//! tm admin users list
//! tm admin users edit 3 --role ROLE_ADMIN
//! tm admin users rm 3
//! tm admin tasks list
//! tm admin tasks edit 12 --completed true
//! ```
//!
//! The server decides who is an administrator; a non-admin session gets
//! "Access denied. Admin role required." from every command here.

use std::io::{self, Write};

use taskmanager_client::views::{AdminDashboard, AdminTab, AdminTaskTable, UserTable};
use taskmanager_client::{Notice, Outcome, ViewHandle};
use taskmanager_core::{Email, Role, TaskId, TaskTitle, TaskUpdate, UserId, UserUpdate};

use super::{CliError, Context, fail, settle};
use crate::{prompt, render};

/// Render the console: header, tabs, then the selected tab.
pub async fn render_console(
    ctx: &Context,
    console: &mut AdminDashboard,
    welcome: &str,
) -> Result<(), CliError> {
    let role = ctx
        .session()
        .current_role()
        .await
        .map(|role| format!(" (Role: {role})"))
        .unwrap_or_default();

    {
        let mut out = io::stdout().lock();
        render::header(&mut out, "Admin Dashboard")?;
        writeln!(out, "{welcome}{role}")?;
        render::tabs(&mut out, console.tab())?;
        writeln!(out)?;
    }

    match console.tab() {
        AdminTab::Overview => {
            // A stats failure still renders the overview, with dashes
            let _ =
                prompt::with_spinner("Loading statistics...", console.load_stats(&ctx.api)).await;
            let mut out = io::stdout().lock();
            render::header(&mut out, "System Overview")?;
            writeln!(
                out,
                "Welcome to the Admin Dashboard! You have administrator privileges."
            )?;
            render::stats(&mut out, &console.stat_cells())?;
        }
        AdminTab::Users => {
            let users = console.users_mut();
            refresh_users(ctx, users).await?;
            let mut out = io::stdout().lock();
            render::header(&mut out, "User Management")?;
            render::user_table(&mut out, users.users().as_slice())?;
        }
        AdminTab::Tasks => {
            let tasks = console.tasks_mut();
            refresh_tasks(ctx, tasks).await?;
            let mut out = io::stdout().lock();
            render::header(&mut out, "Task Management")?;
            render::admin_task_table(&mut out, tasks.tasks().as_slice())?;
        }
    }
    Ok(())
}

async fn refresh_users(ctx: &Context, users: &mut UserTable) -> Result<(), CliError> {
    let outcome = prompt::with_spinner("Loading users...", users.refresh(&ctx.api)).await;
    settle(outcome, users.error())?;
    Ok(())
}

async fn refresh_tasks(ctx: &Context, tasks: &mut AdminTaskTable) -> Result<(), CliError> {
    let outcome = prompt::with_spinner("Loading tasks...", tasks.refresh(&ctx.api)).await;
    let notice = tasks.take_notice();
    settle(outcome, notice.as_ref().map(Notice::message))?;
    Ok(())
}

/// Print the pending alert of a table action, then settle its outcome.
fn finish<T>(outcome: Outcome<T>, notice: Option<&Notice>) -> Result<Option<T>, CliError> {
    if outcome.is_completed()
        && let Some(notice) = notice
    {
        render::notice(&mut io::stdout().lock(), notice)?;
    }
    settle(outcome, notice.map(Notice::message))
}

pub async fn stats(ctx: &Context) -> Result<(), CliError> {
    ctx.require_login().await?;

    let mut console = AdminDashboard::new(ViewHandle::new());
    let outcome =
        prompt::with_spinner("Loading statistics...", console.load_stats(&ctx.api)).await;
    settle(outcome, Some("Failed to load statistics"))?;
    render::stats(&mut io::stdout().lock(), &console.stat_cells())?;
    Ok(())
}

pub async fn list_users(ctx: &Context) -> Result<(), CliError> {
    ctx.require_login().await?;

    let mut users = UserTable::new(ViewHandle::new());
    refresh_users(ctx, &mut users).await?;
    render::user_table(&mut io::stdout().lock(), users.users().as_slice())?;
    Ok(())
}

pub async fn show_user(ctx: &Context, id: UserId) -> Result<(), CliError> {
    ctx.require_login().await?;

    let user = ctx
        .api
        .get_user(id)
        .await
        .map_err(|e| fail(&e.user_message("Failed to fetch user")))?;
    render::user_detail(&mut io::stdout().lock(), &user)?;
    Ok(())
}

pub async fn edit_user(
    ctx: &Context,
    id: UserId,
    username: Option<String>,
    email: Option<String>,
    role: Option<Role>,
) -> Result<(), CliError> {
    ctx.require_login().await?;

    let email = email
        .map(|raw| Email::parse(&raw))
        .transpose()
        .map_err(|e| fail(&e.to_string()))?;
    let username = username
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    let update = UserUpdate {
        username,
        email,
        role,
    };
    if update.is_empty() {
        return Err(fail("Nothing to update: pass --username, --email or --role"));
    }

    let mut users = UserTable::new(ViewHandle::new());
    refresh_users(ctx, &mut users).await?;
    let outcome = users.update(&ctx.api, id, &update).await;
    let notice = users.take_notice();
    if let Some(user) = finish(outcome, notice.as_ref())? {
        render::user_detail(&mut io::stdout().lock(), &user)?;
    }
    Ok(())
}

pub async fn remove_user(ctx: &Context, id: UserId, yes: bool) -> Result<(), CliError> {
    ctx.require_login().await?;

    let mut users = UserTable::new(ViewHandle::new());
    refresh_users(ctx, &mut users).await?;
    let outcome = users.delete(&ctx.api, id, &prompt::Approver::new(yes)).await;
    let notice = users.take_notice();
    finish(outcome, notice.as_ref())?;
    Ok(())
}

pub async fn user_tasks(ctx: &Context, id: UserId) -> Result<(), CliError> {
    ctx.require_login().await?;

    let listing = prompt::with_spinner("Loading tasks...", ctx.api.list_user_tasks(id))
        .await
        .map_err(|e| fail(&e.user_message("Failed to fetch tasks")))?;

    let mut out = io::stdout().lock();
    render::user_summary(&mut out, &listing.user, listing.task_count)?;
    writeln!(out)?;
    render::task_list(&mut out, &listing.tasks)?;
    Ok(())
}

pub async fn list_tasks(ctx: &Context) -> Result<(), CliError> {
    ctx.require_login().await?;

    let mut tasks = AdminTaskTable::new(ViewHandle::new());
    refresh_tasks(ctx, &mut tasks).await?;
    render::admin_task_table(&mut io::stdout().lock(), tasks.tasks().as_slice())?;
    Ok(())
}

pub async fn show_task(ctx: &Context, id: TaskId) -> Result<(), CliError> {
    ctx.require_login().await?;

    let task = ctx
        .api
        .get_task(id)
        .await
        .map_err(|e| fail(&e.user_message("Failed to fetch task")))?;
    render::task_detail(&mut io::stdout().lock(), &task)?;
    Ok(())
}

pub async fn edit_task(
    ctx: &Context,
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
    completed: Option<bool>,
) -> Result<(), CliError> {
    ctx.require_login().await?;

    let title = title
        .map(|raw| TaskTitle::parse(&raw))
        .transpose()
        .map_err(|e| fail(&e.to_string()))?;
    let update = TaskUpdate {
        title,
        description: description.map(|d| d.trim().to_string()),
        completed,
    };
    if update.is_empty() {
        return Err(fail(
            "Nothing to update: pass --title, --description or --completed",
        ));
    }

    let mut tasks = AdminTaskTable::new(ViewHandle::new());
    let outcome = tasks.update(&ctx.api, id, &update).await;
    let notice = tasks.take_notice();
    if let Some(task) = finish(outcome, notice.as_ref())? {
        render::task_detail(&mut io::stdout().lock(), &task)?;
    }
    Ok(())
}

pub async fn remove_task(ctx: &Context, id: TaskId, yes: bool) -> Result<(), CliError> {
    ctx.require_login().await?;

    let mut tasks = AdminTaskTable::new(ViewHandle::new());
    let outcome = tasks.delete(&ctx.api, id, &prompt::Approver::new(yes)).await;
    let notice = tasks.take_notice();
    finish(outcome, notice.as_ref())?;
    Ok(())
}
