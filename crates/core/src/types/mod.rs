//! Core types for the task manager.
//!
//! This module provides type-safe wrappers for the domain concepts exposed by
//! the REST API.

pub mod email;
pub mod id;
pub mod role;
pub mod stats;
pub mod task;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, RoleError};
pub use stats::DashboardStats;
pub use task::{
    MAX_DESCRIPTION_LENGTH, Task, TaskDraft, TaskOwner, TaskTitle, TaskUpdate, TitleError,
};
pub use user::{UserAccount, UserAccountSummary, UserProfile, UserTasks, UserUpdate};
