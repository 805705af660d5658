//! Structured filter predicate compilation
//!
//! A `TasksFilter` lowers to an ordered list of typed clauses which is then
//! compiled onto a parameterized query. Values are always bound parameters,
//! never interpolated into the SQL text.

use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};

use super::model::{TaskPriority, TaskStatus, TasksFilter};

/// One predicate over the tasks relation.
#[derive(Debug, Clone)]
enum Clause {
    TitleContains(String),
    StatusEq(TaskStatus),
    PriorityEq(TaskPriority),
    DueOnOrAfter(NaiveDate),
    DueBefore(NaiveDate),
}

/// Conjunction of clauses in a stable order: title, status, priority,
/// due-after (inclusive), due-before (exclusive).
#[derive(Debug, Clone)]
pub(crate) struct TaskPredicate {
    clauses: Vec<Clause>,
}

impl From<&TasksFilter> for TaskPredicate {
    fn from(filter: &TasksFilter) -> Self {
        let mut clauses = Vec::new();
        if let Some(title) = &filter.title {
            clauses.push(Clause::TitleContains(title.clone()));
        }
        if let Some(status) = filter.status {
            clauses.push(Clause::StatusEq(status));
        }
        if let Some(priority) = filter.priority {
            clauses.push(Clause::PriorityEq(priority));
        }
        if let Some(due_after) = filter.due_after {
            clauses.push(Clause::DueOnOrAfter(due_after));
        }
        if let Some(due_before) = filter.due_before {
            clauses.push(Clause::DueBefore(due_before));
        }
        Self { clauses }
    }
}

impl TaskPredicate {
    /// Append `WHERE ...` to the builder, binding every value as a parameter.
    /// No-op for an empty filter (full scan).
    pub(crate) fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (i, clause) in self.clauses.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            match clause {
                Clause::TitleContains(title) => {
                    builder.push("title ILIKE ");
                    builder.push_bind(format!("%{title}%"));
                }
                Clause::StatusEq(status) => {
                    builder.push("status = ");
                    builder.push_bind(status.as_str());
                }
                Clause::PriorityEq(priority) => {
                    builder.push("priority = ");
                    builder.push_bind(priority.as_str());
                }
                Clause::DueOnOrAfter(date) => {
                    builder.push("due_date >= ");
                    builder.push_bind(*date);
                }
                Clause::DueBefore(date) => {
                    builder.push("due_date < ");
                    builder.push_bind(*date);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT: &str = "SELECT id FROM tasks";

    fn render(filter: &TasksFilter) -> String {
        let mut builder = QueryBuilder::new(SELECT);
        TaskPredicate::from(filter).apply(&mut builder);
        builder.sql().to_string()
    }

    #[test]
    fn test_empty_filter_is_full_scan() {
        assert_eq!(render(&TasksFilter::default()), SELECT);
    }

    #[test]
    fn test_single_clause() {
        let filter = TasksFilter {
            status: Some(TaskStatus::Pending),
            ..Default::default()
        };
        assert_eq!(render(&filter), "SELECT id FROM tasks WHERE status = $1");
    }

    #[test]
    fn test_clause_order_is_stable() {
        let filter = TasksFilter {
            title: Some("re".to_string()),
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            due_after: Some("2025-02-03".parse().unwrap()),
            due_before: Some("2025-02-06".parse().unwrap()),
        };
        assert_eq!(
            render(&filter),
            "SELECT id FROM tasks \
             WHERE title ILIKE $1 \
             AND status = $2 \
             AND priority = $3 \
             AND due_date >= $4 \
             AND due_date < $5"
        );
    }

    #[test]
    fn test_due_bounds_are_half_open() {
        let filter = TasksFilter {
            due_after: Some("2025-02-03".parse().unwrap()),
            due_before: Some("2025-02-06".parse().unwrap()),
            ..Default::default()
        };
        // Inclusive lower bound, exclusive upper bound.
        assert_eq!(
            render(&filter),
            "SELECT id FROM tasks WHERE due_date >= $1 AND due_date < $2"
        );
    }
}
