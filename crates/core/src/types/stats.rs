//! Aggregate counters for the administrator overview.

use serde::{Deserialize, Serialize};

/// System-wide statistics from `GET /admin/stats`.
///
/// Every counter is optional. Whatever the backend leaves out is rendered as
/// a dash, never as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of registered users.
    #[serde(default)]
    pub total_users: Option<u64>,
    /// Number of tasks across all users.
    #[serde(default)]
    pub total_tasks: Option<u64>,
    /// Users considered active by the server.
    #[serde(default)]
    pub active_users: Option<u64>,
    /// Tasks marked completed.
    #[serde(default)]
    pub completed_tasks: Option<u64>,
}
