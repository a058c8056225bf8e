//! The standard user's task board and the create/edit form.

use taskmanager_core::{Task, TaskDraft, TaskId, TaskUpdate};
use tracing::{debug, warn};

use super::{Confirm, Notice, Outcome, ViewHandle};
use crate::api::ApiClient;
use crate::cache::EntityCache;

/// Prompt shown before deleting a task.
pub const DELETE_TASK_PROMPT: &str = "Are you sure you want to delete this task?";

/// Whether a [`TaskForm`] creates a task or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFormMode {
    Create,
    Edit(TaskId),
}

/// Title/description form used for both creating and editing.
#[derive(Debug)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    mode: TaskFormMode,
    submitting: bool,
    error: Option<String>,
}

impl TaskForm {
    /// An empty form for a new task.
    #[must_use]
    pub const fn create() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            mode: TaskFormMode::Create,
            submitting: false,
            error: None,
        }
    }

    /// A form pre-filled from `task`.
    #[must_use]
    pub fn edit(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            mode: TaskFormMode::Edit(task.id),
            submitting: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> TaskFormMode {
        self.mode
    }

    /// False while a save is outstanding.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        !self.submitting
    }

    /// Validation or server error from the last attempt.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate and send the form. Returns the task as stored by the server.
    async fn save(&mut self, api: &ApiClient) -> Outcome<Task> {
        if self.submitting {
            return Outcome::Ignored;
        }
        self.error = None;

        let (request, failure) = match self.mode {
            TaskFormMode::Create => (
                TaskDraft::new(&self.title, &self.description).map(Request::Create),
                "Failed to create task",
            ),
            TaskFormMode::Edit(id) => (
                TaskUpdate::edit(&self.title, &self.description).map(|u| Request::Update(id, u)),
                "Failed to update task",
            ),
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return Outcome::Rejected;
            }
        };

        self.submitting = true;
        let result = match &request {
            Request::Create(draft) => api.create_task(draft).await,
            Request::Update(id, update) => api.update_task(*id, update).await,
        };
        self.submitting = false;

        match result {
            Ok(task) => Outcome::Completed(task),
            Err(e) => {
                self.error = Some(e.user_message(failure));
                Outcome::Failed(e)
            }
        }
    }
}

enum Request {
    Create(TaskDraft),
    Update(TaskId, TaskUpdate),
}

/// What the board should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState<'a> {
    Loading,
    Empty,
    Ready(&'a [Task]),
}

/// A standard user's own tasks.
#[derive(Debug)]
pub struct TaskBoard {
    tasks: EntityCache<Task>,
    loading: bool,
    notice: Option<Notice>,
    handle: ViewHandle,
}

impl TaskBoard {
    /// A board that has not fetched yet.
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
    pub fn state(&self) -> BoardState<'_> {
        if self.loading {
            BoardState::Loading
        } else if self.tasks.is_empty() {
            BoardState::Empty
        } else {
            BoardState::Ready(self.tasks.as_slice())
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

    /// The alert raised by the last action, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Take the pending alert, leaving none.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Fetch the caller's tasks and replace the cache.
    ///
    /// A failure leaves the previous cache in place.
    pub async fn refresh(&mut self, api: &ApiClient) -> Outcome {
        self.loading = true;
        let result = api.list_tasks().await;
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
                self.notice = Some(Notice::error(e.user_message("Failed to load tasks")));
                Outcome::Failed(e)
            }
        }
    }

    /// Submit `form`. On success the saved task is added or replaced in the
    /// cache.
    pub async fn save(&mut self, api: &ApiClient, form: &mut TaskForm) -> Outcome<TaskId> {
        let outcome = form.save(api).await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        let Outcome::Completed(task) = outcome else {
            return outcome.map(|task| task.id);
        };

        let id = task.id;
        match form.mode() {
            TaskFormMode::Create => self.tasks.apply_create(task),
            TaskFormMode::Edit(_) => {
                if !self.tasks.apply_update(task) {
                    debug!(task_id = %id, "Updated task was not cached");
                }
            }
        }
        Outcome::Completed(id)
    }

    /// Mark a task done or not done.
    pub async fn set_completed(
        &mut self,
        api: &ApiClient,
        id: TaskId,
        completed: bool,
    ) -> Outcome<Task> {
        let result = api.update_task(id, &TaskUpdate::completed(completed)).await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        match result {
            Ok(task) => {
                self.tasks.apply_update(task.clone());
                Outcome::Completed(task)
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.user_message("Failed to update task")));
                Outcome::Failed(e)
            }
        }
    }

    /// Delete a task after confirmation.
    ///
    /// The cache only loses the task once the server confirms; on failure it
    /// is untouched and the alert "Failed to delete task" is raised.
    pub async fn delete(
        &mut self,
        api: &ApiClient,
        id: TaskId,
        confirm: &impl Confirm,
    ) -> Outcome {
        if !confirm.confirm(DELETE_TASK_PROMPT) {
            return Outcome::Cancelled;
        }

        let result = api.delete_task(id).await;
        if !self.handle.is_mounted() {
            return Outcome::Discarded;
        }

        match result {
            Ok(()) => {
                self.tasks.apply_delete(id);
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
