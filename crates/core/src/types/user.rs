//! User identities and admin-side account records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{Identified, UserId};
use super::role::Role;
use super::task::Task;

/// The authenticated user's identity, held in memory by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User's ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Account email.
    pub email: Email,
    /// Account role.
    pub role: Role,
}

impl UserProfile {
    /// Whether this profile belongs to an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A user as listed by the admin endpoints.
///
/// Email is kept as a plain string: accounts created before validation
/// existed must still render in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// User's ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Registration timestamp.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Number of tasks owned, when the server reports it.
    #[serde(default)]
    pub task_count: Option<u64>,
}

impl Identified for UserAccount {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Body of an admin user update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    /// New login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// New role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.role.is_none()
    }
}

/// A single user's tasks, as returned by `GET /admin/users/{id}/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTasks {
    /// The owning account.
    pub user: UserAccountSummary,
    /// Tasks owned by the user.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Number of tasks, as counted by the server.
    #[serde(default)]
    pub task_count: usize,
}

/// Minimal account header embedded in [`UserTasks`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserAccountSummary {
    /// User's ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Account role.
    pub role: Role,
}
