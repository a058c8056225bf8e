//! Tasks and the request bodies that create or change them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{Identified, TaskId, UserId};

/// Maximum description length accepted by the backend.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Errors produced while validating task input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    /// The title is empty or whitespace-only.
    #[error("Title is required")]
    Blank,
    /// The title exceeds the backend limit.
    #[error("Title must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The description exceeds the backend limit.
    #[error("Description cannot exceed {max} characters")]
    DescriptionTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A validated, trimmed task title.
///
/// ```
/// use taskmanager_core::TaskTitle;
///
/// assert_eq!(TaskTitle::parse("  Buy milk ").unwrap().as_str(), "Buy milk");
/// assert!(TaskTitle::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Maximum title length accepted by the backend.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TitleError::Blank`] for empty or whitespace-only input and
    /// [`TitleError::TooLong`] past [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, TitleError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TitleError::Blank);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(TitleError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a create-task request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    /// Task title.
    pub title: TaskTitle,
    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskDraft {
    /// Validate raw form input into a draft.
    ///
    /// An empty or whitespace-only description is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`TitleError`] if the title is blank or too long, or the
    /// description is too long.
    pub fn new(title: &str, description: &str) -> Result<Self, TitleError> {
        Ok(Self {
            title: TaskTitle::parse(title)?,
            description: normalize_description(description)?,
        })
    }
}

/// Body of an update-task request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TaskTitle>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskUpdate {
    /// Build an update that rewrites title and description, as the edit form
    /// does.
    ///
    /// # Errors
    ///
    /// Same rules as [`TaskDraft::new`]. An empty description clears it.
    pub fn edit(title: &str, description: &str) -> Result<Self, TitleError> {
        Ok(Self {
            title: Some(TaskTitle::parse(title)?),
            description: Some(normalize_description(description)?.unwrap_or_default()),
            completed: None,
        })
    }

    /// Build an update that only flips the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            title: None,
            description: None,
            completed: Some(completed),
        }
    }

    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

fn normalize_description(description: &str) -> Result<Option<String>, TitleError> {
    let trimmed = description.trim();
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(TitleError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LENGTH,
        });
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
}

/// The owner summary embedded in admin task listings.
///
/// The backend substitutes `{"error": "..."}` when it cannot load the owner,
/// so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOwner {
    /// Owner's user ID.
    #[serde(default)]
    pub id: Option<UserId>,
    /// Owner's username.
    #[serde(default)]
    pub username: Option<String>,
    /// Owner's email address (not validated; display only).
    #[serde(default)]
    pub email: Option<String>,
}

/// A task as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Server-assigned creation timestamp.
    pub created_at: NaiveDateTime,
    /// Last modification timestamp, if the task was ever updated.
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    /// Owner summary (admin listings only).
    #[serde(default, rename = "user", alias = "owner")]
    pub owner: Option<TaskOwner>,
}

impl Task {
    /// The owner's username, or `"Unknown"` when the server did not supply it.
    #[must_use]
    pub fn owner_name(&self) -> &str {
        self.owner
            .as_ref()
            .and_then(|owner| owner.username.as_deref())
            .unwrap_or("Unknown")
    }
}

impl Identified for Task {
    type Id = TaskId;

    fn id(&self) -> TaskId {
        self.id
    }
}
