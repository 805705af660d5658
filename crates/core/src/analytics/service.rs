//! Analytics aggregation service

use std::sync::Arc;

use chrono::Duration;

use super::model::Report;
use super::repository::ReportRepository;
use crate::task::TaskRepository;
use crate::Result;

/// Tasks overdue for longer than this window count toward the report's
/// overdue total.
const REPORT_WINDOW_DAYS: i64 = 7;

pub struct AnalyticsService {
    tasks_repo: Arc<dyn TaskRepository>,
    report_repo: Arc<dyn ReportRepository>,
    report_window: Duration,
}

impl AnalyticsService {
    pub fn new(tasks_repo: Arc<dyn TaskRepository>, report_repo: Arc<dyn ReportRepository>) -> Self {
        Self {
            tasks_repo,
            report_repo,
            report_window: Duration::days(REPORT_WINDOW_DAYS),
        }
    }

    /// Assemble a fresh snapshot from three independent reads and overwrite
    /// the stored one. The reads are each best-effort point-in-time views;
    /// no cross-read consistency is promised.
    pub async fn generate_report(&self) -> Result<()> {
        let tasks_count_by_status = self.tasks_repo.count_by_status().await?;
        let average_completion_seconds = self.tasks_repo.average_completion_seconds().await?;
        let (completed_count, overdue_count) = self
            .tasks_repo
            .count_completed_and_overdue(self.report_window)
            .await?;
        self.report_repo
            .save_report(&Report {
                tasks_count_by_status,
                average_completion_seconds,
                completed_count,
                overdue_count,
            })
            .await
    }

    /// The latest snapshot; `Error::ReportNotFound` before the first
    /// successful generation.
    pub async fn report(&self) -> Result<Report> {
        self.report_repo.report().await
    }
}
