//! Analytics report model

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::task::TaskStatus;

/// A computed snapshot of the task store. The latest snapshot overwrites the
/// previous one; no history is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub tasks_count_by_status: HashMap<TaskStatus, i64>,
    pub average_completion_seconds: f64,
    pub completed_count: i64,
    pub overdue_count: i64,
}

impl Report {
    pub fn count_for(&self, status: TaskStatus) -> i64 {
        self.tasks_count_by_status.get(&status).copied().unwrap_or(0)
    }
}
