//! Task model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(Error::InvalidStatus(value.to_string())),
        }
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(Error::InvalidPriority(value.to_string())),
        }
    }
}

/// A unit of trackable work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Validating constructor. Fails fast on any invariant violation and
    /// performs no side effects.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        title: impl Into<String>,
        description: Option<String>,
        status: TaskStatus,
        priority: TaskPriority,
        due_date: NaiveDate,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::InvalidTitle);
        }
        if due_date < created_at.date_naive() {
            return Err(Error::InvalidDueDate);
        }
        Ok(Self {
            id,
            title,
            description,
            status,
            priority,
            due_date,
            created_at,
            updated_at,
        })
    }
}

/// Mutation payload shared by create and update-by-id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskParams {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
}

/// Conjunction of optional task predicates. An empty filter matches all.
///
/// `due_after` is an inclusive lower bound, `due_before` an exclusive upper
/// bound: `due_after <= due_date < due_before`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksFilter {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_after: Option<NaiveDate>,
    pub due_before: Option<NaiveDate>,
}

impl TasksFilter {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_after.is_none()
            && self.due_before.is_none()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn valid_args() -> (Uuid, DateTime<Utc>, NaiveDate) {
        let created_at = Utc::now();
        let due_date = created_at.date_naive() + Duration::days(1);
        (Uuid::new_v4(), created_at, due_date)
    }

    #[test]
    fn test_new_task_keeps_fields() {
        let (id, created_at, due_date) = valid_args();
        let task = Task::new(
            id,
            "Fix login bug",
            Some("Investigate and fix login issue".to_string()),
            TaskStatus::Pending,
            TaskPriority::High,
            due_date,
            created_at,
            created_at,
        )
        .unwrap();

        assert_eq!(task.id, id);
        assert_eq!(task.title, "Fix login bug");
        assert_eq!(
            task.description,
            Some("Investigate and fix login issue".to_string())
        );
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, due_date);
        assert_eq!(task.created_at, created_at);
        assert_eq!(task.updated_at, created_at);
    }

    #[test]
    fn test_new_task_due_on_creation_day_is_valid() {
        let (id, created_at, _) = valid_args();
        let task = Task::new(
            id,
            "Due today",
            None,
            TaskStatus::Pending,
            TaskPriority::Low,
            created_at.date_naive(),
            created_at,
            created_at,
        );
        assert!(task.is_ok());
    }

    #[test]
    fn test_new_task_rejects_empty_title() {
        let (id, created_at, due_date) = valid_args();
        let err = Task::new(
            id,
            "   ",
            None,
            TaskStatus::Pending,
            TaskPriority::Low,
            due_date,
            created_at,
            created_at,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTitle));
    }

    #[test]
    fn test_new_task_rejects_past_due_date() {
        let (id, created_at, _) = valid_args();
        let err = Task::new(
            id,
            "Overdue at birth",
            None,
            TaskStatus::Pending,
            TaskPriority::Low,
            created_at.date_naive() - Duration::days(1),
            created_at,
            created_at,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDueDate));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!(matches!(
            "todo".parse::<TaskStatus>().unwrap_err(),
            Error::InvalidStatus(value) if value == "todo"
        ));
    }

    #[test]
    fn test_priority_round_trip() {
        for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
            assert_eq!(priority.as_str().parse::<TaskPriority>().unwrap(), priority);
        }
        assert!(matches!(
            "urgent".parse::<TaskPriority>().unwrap_err(),
            Error::InvalidPriority(value) if value == "urgent"
        ));
    }

    #[test]
    fn test_empty_filter() {
        assert!(TasksFilter::default().is_empty());
        let filter = TasksFilter {
            status: Some(TaskStatus::Pending),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}
