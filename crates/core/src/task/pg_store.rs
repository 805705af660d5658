//! Postgres-backed task storage implementation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use super::model::{Task, TaskParams, TaskStatus, TasksFilter};
use super::query::TaskPredicate;
use super::repository::TaskRepository;
use crate::{Error, Result};

const SELECT_TASKS: &str = "SELECT id, title, description, status, priority, \
                            due_date, created_at, updated_at FROM tasks";

/// Task store over a shared Postgres connection pool
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; re-enters the domain through the validating constructor.
#[derive(Debug)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    due_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PgRow> for TaskRow {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            priority: row.try_get("priority")?,
            due_date: row.try_get("due_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = Error;

    fn try_from(row: TaskRow) -> Result<Self> {
        Task::new(
            row.id,
            row.title,
            row.description,
            row.status.parse()?,
            row.priority.parse()?,
            row.due_date,
            row.created_at,
            row.updated_at,
        )
    }
}

/// The store's native unique-violation signal, translated to
/// `Error::Conflict` by the caller. The only place duplicate ids on create
/// or bulk import become visible.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl TaskRepository for PgTaskStore {
    async fn save(&self, task: &Task) -> Result<()> {
        sqlx::query(
            "INSERT INTO tasks \
             (id, title, description, status, priority, due_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::Conflict(format!("task {} already exists", task.id))
            } else {
                err.into()
            }
        })?;
        Ok(())
    }

    async fn save_many(&self, tasks: &[Task]) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        // One multi-row statement: the batch is all-or-nothing without an
        // explicit transaction.
        let mut builder = QueryBuilder::new(
            "INSERT INTO tasks \
             (id, title, description, status, priority, due_date, created_at, updated_at) ",
        );
        builder.push_values(tasks, |mut row, task| {
            row.push_bind(task.id)
                .push_bind(&task.title)
                .push_bind(&task.description)
                .push_bind(task.status.as_str())
                .push_bind(task.priority.as_str())
                .push_bind(task.due_date)
                .push_bind(task.created_at)
                .push_bind(task.updated_at);
        });
        builder.build().execute(&self.pool).await.map_err(|err| {
            if is_unique_violation(&err) {
                Error::Conflict("task ids conflict with existing tasks".to_string())
            } else {
                Error::from(err)
            }
        })?;
        Ok(())
    }

    async fn update_by_id(&self, id: Uuid, params: &TaskParams) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tasks SET title = $2, description = $3, status = $4, \
             priority = $5, due_date = $6, updated_at = now() \
             WHERE id = $1 AND status <> $7",
        )
        .bind(id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.status.as_str())
        .bind(params.priority.as_str())
        .bind(params.due_date)
        .bind(TaskStatus::Done.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Zero rows is either a missing task or one already completed.
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM tasks WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            return match status {
                None => Err(Error::TaskNotFound(id)),
                Some(_) => Err(Error::TaskAlreadyDone(id)),
            };
        }
        Ok(())
    }

    async fn remove_by_id(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }
        Ok(())
    }

    async fn find(&self, filter: &TasksFilter) -> Result<Vec<Task>> {
        let mut builder = QueryBuilder::new(SELECT_TASKS);
        TaskPredicate::from(filter).apply(&mut builder);
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| TaskRow::try_from(row).map_err(Error::from).and_then(Task::try_from))
            .collect()
    }

    async fn all(&self) -> Result<Vec<Task>> {
        self.find(&TasksFilter::default()).await
    }

    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM tasks GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let mut counts = HashMap::with_capacity(rows.len());
        for (status, count) in rows {
            counts.insert(status.parse::<TaskStatus>()?, count);
        }
        Ok(counts)
    }

    async fn average_completion_seconds(&self) -> Result<f64> {
        let average: f64 = sqlx::query_scalar(
            "SELECT COALESCE(AVG(EXTRACT(EPOCH FROM (updated_at - created_at))), 0)\
             ::double precision \
             FROM tasks WHERE status = $1",
        )
        .bind(TaskStatus::Done.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(average)
    }

    async fn count_completed_and_overdue(&self, threshold: Duration) -> Result<(i64, i64)> {
        let cutoff = (Utc::now() - threshold).date_naive();
        let (completed, overdue): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = $1), \
             COUNT(*) FILTER (WHERE status <> $1 AND due_date < $2) \
             FROM tasks",
        )
        .bind(TaskStatus::Done.as_str())
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;
        Ok((completed, overdue))
    }

    async fn remove_overdue_before(&self, cutoff: NaiveDate) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE due_date < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        tracing::debug!(removed = result.rows_affected(), %cutoff, "pruned overdue tasks");
        Ok(())
    }
}
