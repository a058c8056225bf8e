//! Task manager CLI.
//!
//! # Usage
//!
//! ```bash
//! # Create an account, then log in (password is prompted when omitted)
//! tm register alice -e alice@example.com
//! tm login alice
//!
//! # Open the screen for the current session
//! tm dashboard
//!
//! # Manage your own tasks
//! tm tasks add "Write report" -d "Quarterly numbers"
//! tm tasks done 5
//! tm tasks rm 5
//!
//! # Administrators
//! tm admin stats
//! tm admin users list
//! tm admin tasks rm 12 --yes
//! ```
//!
//! # Environment Variables
//!
//! - `TASKMANAGER_API_URL` - REST API base URL
//! - `TASKMANAGER_SESSION_FILE` - where the session token is kept
//! - `RUST_LOG` - log filter (logs go to stderr)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use taskmanager_client::views::AdminTab;
use taskmanager_core::{Role, TaskId, UserId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod prompt;
mod render;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "tm")]
#[command(author, version, about = "Task manager CLI")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        /// Login name
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log in and remember the session
    Login {
        /// Login name
        username: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the session
    Logout,
    /// Show who is logged in
    Status,
    /// Open the dashboard for the current session
    Dashboard {
        /// Admin console tab (`overview`, `users`, `tasks`)
        #[arg(short, long, default_value = "overview")]
        tab: AdminTab,
    },
    /// Manage your own tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Administrator commands
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// List your tasks
    List,
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Edit a task's title or description
    Edit {
        /// Task ID
        id: TaskId,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description (empty clears it)
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Mark a task as completed
    Done {
        /// Task ID
        id: TaskId,

        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete a task
    Rm {
        /// Task ID
        id: TaskId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Show system statistics
    Stats,
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage every user's tasks
    Tasks {
        #[command(subcommand)]
        action: AdminTaskAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,
    /// Show one user
    Show {
        /// User ID
        id: UserId,
    },
    /// Change a user's username, email or role
    Edit {
        /// User ID
        id: UserId,

        /// New username
        #[arg(short, long)]
        username: Option<String>,

        /// New email address
        #[arg(short, long)]
        email: Option<String>,

        /// New role (`ROLE_USER`, `ROLE_ADMIN`)
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Delete a user
    Rm {
        /// User ID
        id: UserId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List a user's tasks
    Tasks {
        /// User ID
        id: UserId,
    },
}

#[derive(Subcommand)]
enum AdminTaskAction {
    /// List all tasks with their owners
    List,
    /// Show one task
    Show {
        /// Task ID
        id: TaskId,
    },
    /// Edit any task
    Edit {
        /// Task ID
        id: TaskId,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description (empty clears it)
        #[arg(short, long)]
        description: Option<String>,

        /// New completion flag
        #[arg(short, long)]
        completed: Option<bool>,
    },
    /// Delete any task
    Rm {
        /// Task ID
        id: TaskId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_tracing(json: bool) {
    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskmanager_cli=warn,taskmanager_client=warn".into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(()) => {}
        // Already shown to the user by the view
        Err(CliError::Reported) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::from_env()?;

    match cli.command {
        Commands::Register {
            username,
            email,
            password,
        } => commands::auth::register(&ctx, username, email, password).await?,
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, username, password).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Status => commands::auth::status(&ctx).await?,
        Commands::Dashboard { tab } => commands::dashboard(&ctx, tab).await?,
        Commands::Tasks { action } => match action {
            TaskAction::List => commands::tasks::list(&ctx).await?,
            TaskAction::Add { title, description } => {
                commands::tasks::add(&ctx, title, description).await?;
            }
            TaskAction::Edit {
                id,
                title,
                description,
            } => commands::tasks::edit(&ctx, id, title, description).await?,
            TaskAction::Done { id, undo } => commands::tasks::done(&ctx, id, !undo).await?,
            TaskAction::Rm { id, yes } => commands::tasks::remove(&ctx, id, yes).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Stats => commands::admin::stats(&ctx).await?,
            AdminAction::Users { action } => match action {
                UserAction::List => commands::admin::list_users(&ctx).await?,
                UserAction::Show { id } => commands::admin::show_user(&ctx, id).await?,
                UserAction::Edit {
                    id,
                    username,
                    email,
                    role,
                } => commands::admin::edit_user(&ctx, id, username, email, role).await?,
                UserAction::Rm { id, yes } => commands::admin::remove_user(&ctx, id, yes).await?,
                UserAction::Tasks { id } => commands::admin::user_tasks(&ctx, id).await?,
            },
            AdminAction::Tasks { action } => match action {
                AdminTaskAction::List => commands::admin::list_tasks(&ctx).await?,
                AdminTaskAction::Show { id } => commands::admin::show_task(&ctx, id).await?,
                AdminTaskAction::Edit {
                    id,
                    title,
                    description,
                    completed,
                } => commands::admin::edit_task(&ctx, id, title, description, completed).await?,
                AdminTaskAction::Rm { id, yes } => {
                    commands::admin::remove_task(&ctx, id, yes).await?;
                }
            },
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_user_edit() {
        let cli = Cli::try_parse_from(["tm", "admin", "users", "edit", "3", "--role", "ROLE_ADMIN"])
            .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Admin {
            action:
                AdminAction::Users {
                    action: UserAction::Edit { id, role, .. },
                },
        } = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(id, UserId::new(3));
        assert_eq!(role, Some(Role::Admin));
    }

    #[test]
    fn test_parse_rm_with_yes() {
        let cli = Cli::try_parse_from(["tm", "tasks", "rm", "5", "--yes"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Tasks {
                action: TaskAction::Rm { yes: true, .. }
            }
        ));
    }

    #[test]
    fn test_rejects_bad_task_id() {
        assert!(Cli::try_parse_from(["tm", "tasks", "done", "five"]).is_err());
    }
}
