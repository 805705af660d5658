//! Task repository trait
//!
//! Defines the interface for task storage operations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use super::model::{Task, TaskParams, TaskStatus, TasksFilter};
use crate::Result;

/// Repository interface for task persistence and aggregate queries
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a single task. Fails with `Error::Conflict` if the id exists.
    async fn save(&self, task: &Task) -> Result<()>;

    /// Insert a batch of tasks in one atomic statement. If any id collides
    /// the whole batch fails with `Error::Conflict` and nothing is inserted.
    async fn save_many(&self, tasks: &[Task]) -> Result<()>;

    /// Overwrite the mutable fields of a task and refresh its `updated_at`.
    /// Fails with `Error::TaskNotFound` for an unknown id and
    /// `Error::TaskAlreadyDone` for a task already marked done.
    async fn update_by_id(&self, id: Uuid, params: &TaskParams) -> Result<()>;

    /// Delete a task. Fails with `Error::TaskNotFound` for an unknown id.
    async fn remove_by_id(&self, id: Uuid) -> Result<()>;

    /// Fetch tasks matching the filter, in storage-native order.
    async fn find(&self, filter: &TasksFilter) -> Result<Vec<Task>>;

    /// Fetch every task. Equivalent to `find` with an empty filter.
    async fn all(&self) -> Result<Vec<Task>>;

    /// Number of tasks per status. Statuses with no tasks are absent.
    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, i64>>;

    /// Average of `updated_at - created_at` in seconds over done tasks.
    /// Zero when no task is done.
    async fn average_completion_seconds(&self) -> Result<f64>;

    /// `(completed, overdue)` counts: completed tasks are those marked done;
    /// overdue tasks are non-done tasks whose due date precedes
    /// `today - threshold`.
    async fn count_completed_and_overdue(&self, threshold: Duration) -> Result<(i64, i64)>;

    /// Bulk-delete tasks whose due date precedes the cutoff. Idempotent:
    /// deleting zero rows is not an error.
    async fn remove_overdue_before(&self, cutoff: NaiveDate) -> Result<()>;
}
