//! Analytics API endpoint

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use serde::Serialize;

use tasks_core::analytics::Report;
use tasks_core::task::TaskStatus;

use super::error::{service_error, unauthorized, RouteError};
use crate::state::AppState;

const DAY_IN_SECONDS: f64 = 24.0 * 60.0 * 60.0;

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub pending_tasks_count: i64,
    pub in_progress_tasks_count: i64,
    pub done_tasks_count: i64,
    pub average_completion_time_in_days: String,
    pub amount_of_completed_tasks: i64,
    pub amount_of_overdue_tasks: i64,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            pending_tasks_count: report.count_for(TaskStatus::Pending),
            in_progress_tasks_count: report.count_for(TaskStatus::InProgress),
            done_tasks_count: report.count_for(TaskStatus::Done),
            average_completion_time_in_days: format!(
                "{:.2}",
                report.average_completion_seconds / DAY_IN_SECONDS
            ),
            amount_of_completed_tasks: report.completed_count,
            amount_of_overdue_tasks: report.overdue_count,
        }
    }
}

/// GET /analytics - The latest report snapshot
async fn report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReportResponse>, RouteError> {
    state
        .resolve_subject(&headers)
        .map_err(|err| unauthorized(err.to_string()))?;
    let report = state
        .analytics_service()
        .report()
        .await
        .map_err(service_error)?;
    Ok(Json(ReportResponse::from(report)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/analytics", get(report))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn report(average_completion_seconds: f64) -> Report {
        Report {
            tasks_count_by_status: HashMap::from([
                (TaskStatus::Pending, 2),
                (TaskStatus::InProgress, 2),
                (TaskStatus::Done, 1),
            ]),
            average_completion_seconds,
            completed_count: 1,
            overdue_count: 3,
        }
    }

    #[test]
    fn test_report_response_fields() {
        let response = ReportResponse::from(report(129_600.0));
        assert_eq!(response.pending_tasks_count, 2);
        assert_eq!(response.in_progress_tasks_count, 2);
        assert_eq!(response.done_tasks_count, 1);
        assert_eq!(response.average_completion_time_in_days, "1.50");
        assert_eq!(response.amount_of_completed_tasks, 1);
        assert_eq!(response.amount_of_overdue_tasks, 3);
    }

    #[test]
    fn test_average_formats_with_two_decimals() {
        assert_eq!(
            ReportResponse::from(report(0.0)).average_completion_time_in_days,
            "0.00"
        );
        assert_eq!(
            ReportResponse::from(report(86_400.0)).average_completion_time_in_days,
            "1.00"
        );
    }

    #[test]
    fn test_missing_statuses_count_as_zero() {
        let report = Report {
            tasks_count_by_status: HashMap::new(),
            average_completion_seconds: 0.0,
            completed_count: 0,
            overdue_count: 0,
        };
        let response = ReportResponse::from(report);
        assert_eq!(response.pending_tasks_count, 0);
        assert_eq!(response.in_progress_tasks_count, 0);
        assert_eq!(response.done_tasks_count, 0);
    }
}
