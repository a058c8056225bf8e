//! Plain-text rendering of view state.
//!
//! Everything takes a writer so output can be checked in tests; commands pass
//! a locked stdout.

use std::io::{self, Write};

use taskmanager_client::Notice;
use taskmanager_client::views::{AdminTab, StatCell};
use taskmanager_core::{Task, UserAccount, UserAccountSummary};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn header(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))
}

pub fn notice(out: &mut impl Write, notice: &Notice) -> io::Result<()> {
    match notice {
        Notice::Success(message) => writeln!(out, "✓ {message}"),
        Notice::Error(message) => writeln!(out, "✗ {message}"),
    }
}

/// A standard user's task list.
pub fn task_list(out: &mut impl Write, tasks: &[Task]) -> io::Result<()> {
    if tasks.is_empty() {
        writeln!(out, "No tasks yet")?;
        return writeln!(out, "Create your first task to get started!");
    }

    for task in tasks {
        task_line(out, task)?;
    }
    Ok(())
}

fn task_line(out: &mut impl Write, task: &Task) -> io::Result<()> {
    let mark = if task.completed { "x" } else { " " };
    writeln!(out, "[{mark}] #{} {}", task.id, task.title)?;
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        writeln!(out, "      {description}")?;
    }
    writeln!(
        out,
        "      Created: {}",
        task.created_at.format(DATE_FORMAT)
    )
}

/// One task with every field.
pub fn task_detail(out: &mut impl Write, task: &Task) -> io::Result<()> {
    writeln!(out, "ID:          {}", task.id)?;
    writeln!(out, "Title:       {}", task.title)?;
    writeln!(
        out,
        "Description: {}",
        task.description.as_deref().unwrap_or("-")
    )?;
    writeln!(
        out,
        "Status:      {}",
        if task.completed { "Completed" } else { "Pending" }
    )?;
    writeln!(out, "Owner:       {}", task.owner_name())?;
    writeln!(out, "Created:     {}", task.created_at.format(DATE_FORMAT))?;
    if let Some(updated) = task.updated_at {
        writeln!(out, "Updated:     {}", updated.format(DATE_FORMAT))?;
    }
    Ok(())
}

/// Every task with its owner, as shown on the admin console.
pub fn admin_task_table(out: &mut impl Write, tasks: &[Task]) -> io::Result<()> {
    writeln!(out, "Total Tasks: {}", tasks.len())?;
    if tasks.is_empty() {
        return Ok(());
    }

    writeln!(
        out,
        "{:<6} {:<32} {:<16} {:<10} {}",
        "ID", "TITLE", "OWNER", "STATUS", "CREATED"
    )?;
    for task in tasks {
        writeln!(
            out,
            "{:<6} {:<32} {:<16} {:<10} {}",
            task.id.as_i64(),
            truncate(&task.title, 32),
            truncate(task.owner_name(), 16),
            if task.completed { "Completed" } else { "Pending" },
            task.created_at.format(DATE_FORMAT)
        )?;
    }
    Ok(())
}

pub fn user_table(out: &mut impl Write, users: &[UserAccount]) -> io::Result<()> {
    if users.is_empty() {
        writeln!(out, "No users found")?;
        return writeln!(out, "There are no users in the system.");
    }

    writeln!(
        out,
        "{:<6} {:<16} {:<28} {:<11} {:<6} {}",
        "ID", "USERNAME", "EMAIL", "ROLE", "TASKS", "JOINED"
    )?;
    for user in users {
        let joined = user
            .created_at
            .map_or_else(|| "-".to_string(), |at| at.format(DATE_FORMAT).to_string());
        writeln!(
            out,
            "{:<6} {:<16} {:<28} {:<11} {:<6} {}",
            user.id.as_i64(),
            truncate(&user.username, 16),
            truncate(&user.email, 28),
            user.role.as_str(),
            user.task_count.unwrap_or(0),
            joined
        )?;
    }
    Ok(())
}

pub fn user_detail(out: &mut impl Write, user: &UserAccount) -> io::Result<()> {
    writeln!(out, "ID:       {}", user.id)?;
    writeln!(out, "Username: {}", user.username)?;
    writeln!(out, "Email:    {}", user.email)?;
    writeln!(out, "Role:     {}", user.role)?;
    if let Some(created) = user.created_at {
        writeln!(out, "Joined:   {}", created.format(DATE_FORMAT))?;
    }
    Ok(())
}

pub fn user_summary(out: &mut impl Write, user: &UserAccountSummary, count: usize) -> io::Result<()> {
    writeln!(
        out,
        "{} <{}> ({}) - {count} task(s)",
        user.username, user.email, user.role
    )
}

pub fn tabs(out: &mut impl Write, active: AdminTab) -> io::Result<()> {
    let line: Vec<String> = AdminTab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    writeln!(out, "{}", line.join(" | "))
}

pub fn stats(out: &mut impl Write, cells: &[StatCell]) -> io::Result<()> {
    for cell in cells {
        writeln!(out, "{:<16} {}", format!("{}:", cell.label), cell.value)?;
    }
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
