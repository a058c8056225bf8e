//! Administrator endpoints.
//!
//! The server answers 403 with `{"error": "Access denied. Admin role
//! required."}` for non-admin callers; that surfaces as
//! [`ApiError::Unauthorized`].

use taskmanager_core::{
    DashboardStats, Task, TaskId, TaskUpdate, UserAccount, UserId, UserTasks, UserUpdate,
};
use tracing::{debug, instrument};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// List every account.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        let users: Vec<UserAccount> = self.get("/admin/users").await?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// Get a single account.
    ///
    /// # Errors
    ///
    /// Returns error if the user is not found or the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: UserId) -> Result<UserAccount, ApiError> {
        self.get(&format!("/admin/users/{id}")).await
    }

    /// Update an account's username, email or role.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an empty update (nothing is sent),
    /// or error if the request fails.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<UserAccount, ApiError> {
        if update.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        self.put(&format!("/admin/users/{id}"), update).await
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/users/{id}")).await
    }

    /// List the tasks owned by one user.
    ///
    /// # Errors
    ///
    /// Returns error if the user is not found or the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn list_user_tasks(&self, id: UserId) -> Result<UserTasks, ApiError> {
        self.get(&format!("/admin/users/{id}/tasks")).await
    }

    /// List every task with its owner.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_all_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let tasks: Vec<Task> = self.get("/admin/tasks").await?;
        debug!(count = tasks.len(), "Fetched all tasks");
        Ok(tasks)
    }

    /// Get any task by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the task is not found or the request fails.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        self.get(&format!("/admin/tasks/{id}")).await
    }

    /// Update any task.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an empty update (nothing is sent),
    /// or error if the request fails.
    #[instrument(skip(self, update), fields(task_id = %id))]
    pub async fn admin_update_task(
        &self,
        id: TaskId,
        update: &TaskUpdate,
    ) -> Result<Task, ApiError> {
        if update.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        self.put(&format!("/admin/tasks/{id}"), update).await
    }

    /// Delete any task.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn admin_delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/tasks/{id}")).await
    }

    /// System-wide counters.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/admin/stats").await
    }
}
