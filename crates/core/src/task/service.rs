//! Task service
//!
//! Orchestrates validation and repository calls. Storage failures surface as
//! `Error::Storage` (unexpected); everything else in the taxonomy is
//! client-caused and safe to hand back to the caller.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::model::{Task, TaskParams, TasksFilter};
use super::repository::TaskRepository;
use crate::{Error, Result};

/// How long past its due date a task survives before the pruning job is
/// allowed to remove it.
const RETENTION_WINDOW_DAYS: i64 = 7;

pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    retention_window: Duration,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self {
            repo,
            retention_window: Duration::days(RETENTION_WINDOW_DAYS),
        }
    }

    /// Create a task from the given params: fresh v4 id, creation and update
    /// timestamps stamped now, invariants checked before anything is stored.
    pub async fn create_task(&self, params: TaskParams) -> Result<Task> {
        let now = Utc::now();
        let task = Task::new(
            Uuid::new_v4(),
            params.title,
            params.description,
            params.status,
            params.priority,
            params.due_date,
            now,
            now,
        )?;
        self.repo.save(&task).await?;
        Ok(task)
    }

    pub async fn find_tasks(&self, filter: &TasksFilter) -> Result<Vec<Task>> {
        self.repo.find(filter).await
    }

    pub async fn update_task_by_id(&self, id: Uuid, params: &TaskParams) -> Result<()> {
        if params.title.trim().is_empty() {
            return Err(Error::InvalidTitle);
        }
        self.repo.update_by_id(id, params).await
    }

    pub async fn remove_task_by_id(&self, id: Uuid) -> Result<()> {
        self.repo.remove_by_id(id).await
    }

    pub async fn export_tasks(&self) -> Result<Vec<Task>> {
        self.repo.all().await
    }

    /// Bulk insert of pre-validated tasks. All-or-nothing: any id collision
    /// fails the whole batch and leaves the store unchanged.
    pub async fn import_tasks(&self, tasks: Vec<Task>) -> Result<()> {
        self.repo.save_many(&tasks).await
    }

    /// Remove every task whose due date fell out of the retention window.
    pub async fn prune_overdue_tasks(&self) -> Result<()> {
        let cutoff = (Utc::now() - self.retention_window).date_naive();
        self.repo.remove_overdue_before(cutoff).await
    }
}
