//! Administrator console: overview, user management, task management.

use std::fmt;
use std::str::FromStr;

use taskmanager_core::{DashboardStats, Task, TaskId, TaskUpdate, UserAccount, UserId, UserUpdate};
use tracing::warn;

use super::tasks::DELETE_TASK_PROMPT;
use super::{Confirm, Notice, Outcome, ViewHandle};
use crate::api::{ApiClient, ApiError};
use crate::cache::EntityCache;

/// Console tabs, in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Overview,
    Users,
    Tasks,
}

impl AdminTab {
    pub const ALL: [Self; 3] = [Self::Overview, Self::Users, Self::Tasks];

    /// Tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Users => "User Management",
            Self::Tasks => "Task Management",
        }
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdminTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Self::Overview),
            "users" => Ok(Self::Users),
            "tasks" => Ok(Self::Tasks),
            other => Err(format!("Unknown tab: {other}")),
        }
    }
}

/// One labelled counter on the overview tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCell {
    pub label: &'static str,
    /// The count, or `-` when unknown.
    pub value: String,
}

fn cell(label: &'static str, value: Option<u64>) -> StatCell {
    StatCell {
        label,
        value: value.map_or_else(|| "-".to_string(), |v| v.to_string()),
    }
}

/// The administrator console.
#[derive(Debug)]
pub struct AdminDashboard {
    tab: AdminTab,
    stats: Option<DashboardStats>,
    stats_loading: bool,
    users: UserTable,
    tasks: AdminTaskTable,
    handle: ViewHandle,
}

impl AdminDashboard {
    /// A console on the overview tab with nothing fetched yet.
    #[must_use]
    pub fn new(handle: ViewHandle) -> Self {
        Self {
            tab: AdminTab::default(),
            stats: None,
            stats_loading: true,
            users: UserTable::new(handle.clone()),
            tasks: AdminTaskTable::new(handle.clone()),
            handle,
        }
    }

    #[must_use]
    pub const fn tab(&self) -> AdminTab {
        self.tab
    }

    pub const fn select(&mut self, tab: AdminTab) {
        self.tab = tab;
    }

    #[must_use]
    pub const fn users(&self) -> &UserTable {
        &self.users
    }

    pub const fn users_mut(&mut self) -> &mut UserTable {
        &mut self.users
    }

    #[must_use]
    pub const fn tasks(&self) -> &AdminTaskTable {
        &self.tasks
    }

    pub const fn tasks_mut(&mut self) -> &mut AdminTaskTable {
        &mut self.tasks
    }

    #[must_use]
    pub const fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    #[must_use]
    pub const fn is_stats_loading(&self) -> bool {
        self.stats_loading
    }

    /// Fetch the overview counters.
    ///
    /// A failure is logged and tolerated: the overview shows dashes and the
    /// rest of the console keeps working.
    pub async fn load_stats(&mut self, api: &ApiClient) -> Outcome {
        self.stats_loading = true;
        let result = api.stats().await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }
        self.stats_loading = false;

        match result {
            Ok(stats) => {
                self.stats = Some(stats);
                Outcome::Completed(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch dashboard stats");
                self.stats = None;
                Outcome::Failed(e)
            }
        }
    }

    /// Overview counters in display order.
    #[must_use]
    pub fn stat_cells(&self) -> [StatCell; 4] {
        let stats = self.stats.as_ref();
        [
            cell("Total Users", stats.and_then(|s| s.total_users)),
            cell("Total Tasks", stats.and_then(|s| s.total_tasks)),
            cell("Active Users", stats.and_then(|s| s.active_users)),
            cell("Completed Tasks", stats.and_then(|s| s.completed_tasks)),
        ]
    }
}

/// Every account, with edit and delete.
#[derive(Debug)]
pub struct UserTable {
    users: EntityCache<UserAccount>,
    loading: bool,
    error: Option<String>,
    notice: Option<Notice>,
    handle: ViewHandle,
}

impl UserTable {
    #[must_use]
    pub fn new(handle: ViewHandle) -> Self {
        Self {
            users: EntityCache::new(),
            loading: true,
            error: None,
            notice: None,
            handle,
        }
    }

    #[must_use]
    pub const fn users(&self) -> &EntityCache<UserAccount> {
        &self.users
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set when the last fetch failed; the table offers a retry.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Whether the table offers a delete action for `user`.
    #[must_use]
    pub const fn can_delete(user: &UserAccount) -> bool {
        !user.role.is_admin()
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> Outcome {
        self.loading = true;
        let result = api.list_users().await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }
        self.loading = false;

        match result {
            Ok(users) => {
                self.error = None;
                self.users.load(users);
                Outcome::Completed(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch users");
                self.error = Some("Failed to fetch users".to_string());
                Outcome::Failed(e)
            }
        }
    }

    /// Save an edited account.
    pub async fn update(
        &mut self,
        api: &ApiClient,
        id: UserId,
        update: &UserUpdate,
    ) -> Outcome<UserAccount> {
        let result = api.update_user(id, update).await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        match result {
            Ok(user) => {
                self.users.apply_update(user.clone());
                self.notice = Some(Notice::success("User updated successfully"));
                Outcome::Completed(user)
            }
            Err(e) => {
                warn!(user_id = %id, error = %e, "Failed to update user");
                self.notice = Some(Notice::error(match &e {
                    ApiError::Validation(message) => message.clone(),
                    _ => "Failed to update user".to_string(),
                }));
                Outcome::Failed(e)
            }
        }
    }

    /// Delete a cached account after confirmation.
    ///
    /// Administrator accounts are never deleted from here, and an id that
    /// is not in the table is refused; neither case sends a request.
    pub async fn delete(&mut self, api: &ApiClient, id: UserId, confirm: &impl Confirm) -> Outcome {
        let Some(user) = self.users.get(id) else {
            self.notice = Some(Notice::error(format!("User {id} not found")));
            return Outcome::Rejected;
        };
        if !Self::can_delete(user) {
            self.notice = Some(Notice::error("Administrator accounts cannot be deleted"));
            return Outcome::Rejected;
        }

        let prompt = format!(
            "Are you sure you want to delete user \"{}\"?",
            user.username
        );
        if !confirm.confirm(&prompt) {
            return Outcome::Cancelled;
        }

        let result = api.delete_user(id).await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        match result {
            Ok(()) => {
                self.users.apply_delete(id);
                self.notice = Some(Notice::success("User deleted successfully"));
                Outcome::Completed(())
            }
            Err(e) => {
                warn!(user_id = %id, error = %e, "Failed to delete user");
                self.notice = Some(Notice::error("Failed to delete user"));
                Outcome::Failed(e)
            }
        }
    }
}

/// Every task in the system, with its owner.
#[derive(Debug)]
pub struct AdminTaskTable {
    tasks: EntityCache<Task>,
    loading: bool,
    notice: Option<Notice>,
    handle: ViewHandle,
}

impl AdminTaskTable {
    #[must_use]
    pub fn new(handle: ViewHandle) -> Self {
        Self {
            tasks: EntityCache::new(),
            loading: true,
            notice: None,
            handle,
        }
    }

    #[must_use]
    pub const fn tasks(&self) -> &EntityCache<Task> {
        &self.tasks
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// "Total Tasks" as shown above the table.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> Outcome {
        self.loading = true;
        let result = api.list_all_tasks().await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }
        self.loading = false;

        match result {
            Ok(tasks) => {
                self.tasks.load(tasks);
                Outcome::Completed(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch tasks");
                self.notice = Some(Notice::error("Failed to fetch tasks"));
                Outcome::Failed(e)
            }
        }
    }

    /// Update any task.
    pub async fn update(
        &mut self,
        api: &ApiClient,
        id: TaskId,
        update: &TaskUpdate,
    ) -> Outcome<Task> {
        let result = api.admin_update_task(id, update).await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        match result {
            Ok(task) => {
                self.tasks.apply_update(task.clone());
                self.notice = Some(Notice::success("Task updated successfully"));
                Outcome::Completed(task)
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "Failed to update task");
                self.notice = Some(Notice::error(e.user_message("Failed to update task")));
                Outcome::Failed(e)
            }
        }
    }

    /// Delete any task after confirmation.
    pub async fn delete(&mut self, api: &ApiClient, id: TaskId, confirm: &impl Confirm) -> Outcome {
        if !confirm.confirm(DELETE_TASK_PROMPT) {
            return Outcome::Cancelled;
        }

        let result = api.admin_delete_task(id).await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        match result {
            Ok(()) => {
                self.tasks.apply_delete(id);
                self.notice = Some(Notice::success("Task deleted successfully"));
                Outcome::Completed(())
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "Failed to delete task");
                self.notice = Some(Notice::error("Failed to delete task"));
                Outcome::Failed(e)
            }
        }
    }
}
