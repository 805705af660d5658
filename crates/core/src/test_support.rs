//! In-memory repository implementations used as test doubles.
//!
//! The task store mirrors the SQL semantics (case-insensitive title
//! containment, half-open due-date bounds, done-guard on update, atomic
//! batch insert) so service-level fixtures exercise the same contract the
//! Postgres store honors.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analytics::{Report, ReportRepository};
use crate::task::{Task, TaskParams, TaskRepository, TaskStatus, TasksFilter};
use crate::{Error, Result};

#[derive(Default)]
pub(crate) struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
    fail: RwLock<bool>,
}

impl MemoryTaskStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a storage error.
    pub(crate) async fn fail_storage(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    async fn check(&self) -> Result<()> {
        if *self.fail.read().await {
            return Err(Error::Storage("memory store failure injected".to_string()));
        }
        Ok(())
    }

    fn matches(task: &Task, filter: &TasksFilter) -> bool {
        if let Some(title) = &filter.title {
            if !task.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        if let Some(status) = filter.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = filter.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(due_after) = filter.due_after {
            if task.due_date < due_after {
                return false;
            }
        }
        if let Some(due_before) = filter.due_before {
            if task.due_date >= due_before {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    async fn save(&self, task: &Task) -> Result<()> {
        self.check().await?;
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(Error::Conflict(format!("task {} already exists", task.id)));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn save_many(&self, batch: &[Task]) -> Result<()> {
        self.check().await?;
        let mut tasks = self.tasks.write().await;
        if batch.iter().any(|task| tasks.contains_key(&task.id)) {
            return Err(Error::Conflict(
                "task ids conflict with existing tasks".to_string(),
            ));
        }
        for task in batch {
            tasks.insert(task.id, task.clone());
        }
        Ok(())
    }

    async fn update_by_id(&self, id: Uuid, params: &TaskParams) -> Result<()> {
        self.check().await?;
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(Error::TaskNotFound(id))?;
        if task.status == TaskStatus::Done {
            return Err(Error::TaskAlreadyDone(id));
        }
        task.title = params.title.clone();
        task.description = params.description.clone();
        task.status = params.status;
        task.priority = params.priority;
        task.due_date = params.due_date;
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_by_id(&self, id: Uuid) -> Result<()> {
        self.check().await?;
        let mut tasks = self.tasks.write().await;
        tasks.remove(&id).map(|_| ()).ok_or(Error::TaskNotFound(id))
    }

    async fn find(&self, filter: &TasksFilter) -> Result<Vec<Task>> {
        self.check().await?;
        let tasks = self.tasks.read().await;
        Ok(tasks
            .values()
            .filter(|task| Self::matches(task, filter))
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Task>> {
        self.find(&TasksFilter::default()).await
    }

    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, i64>> {
        self.check().await?;
        let tasks = self.tasks.read().await;
        let mut counts = HashMap::new();
        for task in tasks.values() {
            *counts.entry(task.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn average_completion_seconds(&self) -> Result<f64> {
        self.check().await?;
        let tasks = self.tasks.read().await;
        let durations: Vec<f64> = tasks
            .values()
            .filter(|task| task.status == TaskStatus::Done)
            .map(|task| (task.updated_at - task.created_at).num_seconds() as f64)
            .collect();
        if durations.is_empty() {
            return Ok(0.0);
        }
        Ok(durations.iter().sum::<f64>() / durations.len() as f64)
    }

    async fn count_completed_and_overdue(&self, threshold: Duration) -> Result<(i64, i64)> {
        self.check().await?;
        let cutoff = (Utc::now() - threshold).date_naive();
        let tasks = self.tasks.read().await;
        let completed = tasks
            .values()
            .filter(|task| task.status == TaskStatus::Done)
            .count() as i64;
        let overdue = tasks
            .values()
            .filter(|task| task.status != TaskStatus::Done && task.due_date < cutoff)
            .count() as i64;
        Ok((completed, overdue))
    }

    async fn remove_overdue_before(&self, cutoff: NaiveDate) -> Result<()> {
        self.check().await?;
        let mut tasks = self.tasks.write().await;
        tasks.retain(|_, task| task.due_date >= cutoff);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryReportStore {
    report: RwLock<Option<Report>>,
}

impl MemoryReportStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for MemoryReportStore {
    async fn save_report(&self, report: &Report) -> Result<()> {
        *self.report.write().await = Some(report.clone());
        Ok(())
    }

    async fn report(&self) -> Result<Report> {
        self.report.read().await.clone().ok_or(Error::ReportNotFound)
    }
}
