//! The caller's own tasks.

use taskmanager_core::{Task, TaskDraft, TaskId, TaskUpdate};
use tracing::{debug, instrument};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// List the caller's tasks in server order.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let tasks: Vec<Task> = self.get("/tasks").await?;
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    /// Create a task and return it as stored by the server.
    ///
    /// # Errors
    ///
    /// Returns error if the server rejects the task or the request fails.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.post("/tasks", draft).await
    }

    /// Update one of the caller's tasks.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an empty update (nothing is sent),
    /// or error if the task is not the caller's or the request fails.
    #[instrument(skip(self, update), fields(task_id = %id))]
    pub async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, ApiError> {
        if update.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        self.put(&format!("/tasks/{id}"), update).await
    }

    /// Delete one of the caller's tasks.
    ///
    /// # Errors
    ///
    /// Returns error if the task is not the caller's or the request fails.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.delete(&format!("/tasks/{id}")).await
    }
}
