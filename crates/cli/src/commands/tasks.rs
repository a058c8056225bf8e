//! `tasks` subcommands: the caller's own tasks.

use std::io::{self, Write};

use taskmanager_client::ViewHandle;
use taskmanager_client::views::{TaskBoard, TaskForm};
use taskmanager_core::TaskId;

use super::{CliError, Context, fail, settle};
use crate::{prompt, render};

/// Fetch the board, showing the spinner while the request is out.
async fn load_board(ctx: &Context) -> Result<TaskBoard, CliError> {
    ctx.require_login().await?;

    let mut board = TaskBoard::new(ViewHandle::new());
    let outcome = prompt::with_spinner("Loading tasks...", board.refresh(&ctx.api)).await;
    let notice = board.take_notice();
    settle(outcome, notice.as_ref().map(|n| n.message()))?;
    Ok(board)
}

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let board = load_board(ctx).await?;
    render::task_list(&mut io::stdout().lock(), board.tasks().as_slice())?;
    Ok(())
}

pub async fn add(ctx: &Context, title: String, description: String) -> Result<(), CliError> {
    ctx.require_login().await?;

    let mut board = TaskBoard::new(ViewHandle::new());
    let mut form = TaskForm::create();
    form.title = title;
    form.description = description;

    let outcome = board.save(&ctx.api, &mut form).await;
    let Some(id) = settle(outcome, form.error())? else {
        return Ok(());
    };

    let mut out = io::stdout().lock();
    writeln!(out, "Created task #{id}")?;
    if let Some(task) = board.tasks().get(id) {
        render::task_detail(&mut out, task)?;
    }
    Ok(())
}

/// Edit title and/or description. Fields not given keep their current value.
pub async fn edit(
    ctx: &Context,
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
) -> Result<(), CliError> {
    if title.is_none() && description.is_none() {
        return Err(fail("Nothing to update: pass --title and/or --description"));
    }

    let mut board = load_board(ctx).await?;
    let Some(task) = board.tasks().get(id) else {
        return Err(fail(&format!("Task #{id} not found")));
    };

    let mut form = TaskForm::edit(task);
    if let Some(title) = title {
        form.title = title;
    }
    if let Some(description) = description {
        form.description = description;
    }

    let outcome = board.save(&ctx.api, &mut form).await;
    if settle(outcome, form.error())?.is_some() {
        writeln!(io::stdout().lock(), "Updated task #{id}")?;
    }
    Ok(())
}

pub async fn done(ctx: &Context, id: TaskId, completed: bool) -> Result<(), CliError> {
    ctx.require_login().await?;

    let mut board = TaskBoard::new(ViewHandle::new());
    let outcome = board.set_completed(&ctx.api, id, completed).await;
    let notice = board.take_notice();
    let Some(task) = settle(outcome, notice.as_ref().map(|n| n.message()))? else {
        return Ok(());
    };

    let state = if task.completed { "completed" } else { "pending" };
    writeln!(io::stdout().lock(), "Task #{} is now {state}", task.id)?;
    Ok(())
}

pub async fn remove(ctx: &Context, id: TaskId, yes: bool) -> Result<(), CliError> {
    let mut board = load_board(ctx).await?;
    if !board.tasks().contains(id) {
        return Err(fail(&format!("Task #{id} not found")));
    }

    let outcome = board.delete(&ctx.api, id, &prompt::Approver::new(yes)).await;
    let notice = board.take_notice();
    if settle(outcome, notice.as_ref().map(|n| n.message()))?.is_some() {
        writeln!(io::stdout().lock(), "Task deleted")?;
    }
    Ok(())
}
