//! Task API endpoints
//!
//! CRUD, filtered lookup, and bulk import/export. Every route requires an
//! authenticated caller.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tasks_core::task::{Task, TaskParams, TaskPriority, TaskStatus, TasksFilter};

use super::error::{bad_request, service_error, unauthorized, RouteError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: String,
}

#[derive(Debug, Deserialize)]
pub struct FindTasksQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_after: Option<String>,
    #[serde(default)]
    pub due_before: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

/// Import/export record: every field is a string so payloads survive tools
/// that know nothing about the domain types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title,
            description: task.description,
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            due_date: task.due_date.to_string(),
            created_at: task.created_at.date_naive().to_string(),
            updated_at: task.updated_at.date_naive().to_string(),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, RouteError> {
    value
        .parse()
        .map_err(|_| bad_request(format!("invalid date {value:?}, expected YYYY-MM-DD")))
}

fn task_from_record(record: TaskRecord) -> Result<Task, RouteError> {
    let id = Uuid::parse_str(&record.id)
        .map_err(|_| bad_request(format!("invalid task id {:?}", record.id)))?;
    let status: TaskStatus = record.status.parse().map_err(service_error)?;
    let priority: TaskPriority = record.priority.parse().map_err(service_error)?;
    let due_date = parse_date(&record.due_date)?;
    let created_at = parse_date(&record.created_at)?
        .and_time(NaiveTime::MIN)
        .and_utc();
    let updated_at = parse_date(&record.updated_at)?
        .and_time(NaiveTime::MIN)
        .and_utc();

    Task::new(
        id,
        record.title,
        record.description,
        status,
        priority,
        due_date,
        created_at,
        updated_at,
    )
    .map_err(service_error)
}

fn task_params(req: TaskRequest) -> Result<TaskParams, RouteError> {
    Ok(TaskParams {
        title: req.title,
        description: req.description,
        status: req.status.parse().map_err(service_error)?,
        priority: req.priority.parse().map_err(service_error)?,
        due_date: parse_date(&req.due_date)?,
    })
}

fn filter_from_query(query: FindTasksQuery) -> Result<TasksFilter, RouteError> {
    let present = |value: Option<String>| value.filter(|value| !value.is_empty());
    let mut filter = TasksFilter {
        title: present(query.title),
        ..Default::default()
    };
    if let Some(status) = present(query.status) {
        filter.status = Some(status.parse().map_err(service_error)?);
    }
    if let Some(priority) = present(query.priority) {
        filter.priority = Some(priority.parse().map_err(service_error)?);
    }
    if let Some(due_after) = present(query.due_after) {
        filter.due_after = Some(parse_date(&due_after)?);
    }
    if let Some(due_before) = present(query.due_before) {
        filter.due_before = Some(parse_date(&due_before)?);
    }
    Ok(filter)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - Filtered task lookup
async fn find_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FindTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, RouteError> {
    state.resolve_subject(&headers).map_err(unauthorized_error)?;
    let filter = filter_from_query(query)?;
    let tasks = state
        .task_service()
        .find_tasks(&filter)
        .await
        .map_err(service_error)?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), RouteError> {
    state.resolve_subject(&headers).map_err(unauthorized_error)?;
    let params = task_params(req)?;
    let task = state
        .task_service()
        .create_task(params)
        .await
        .map_err(service_error)?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// PUT /tasks/{id} - Update a task
async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<TaskRequest>,
) -> Result<StatusCode, RouteError> {
    state.resolve_subject(&headers).map_err(unauthorized_error)?;
    let params = task_params(req)?;
    state
        .task_service()
        .update_task_by_id(id, &params)
        .await
        .map_err(service_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /tasks/{id} - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, RouteError> {
    state.resolve_subject(&headers).map_err(unauthorized_error)?;
    state
        .task_service()
        .remove_task_by_id(id)
        .await
        .map_err(service_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /tasks/export - Export every task as a record of strings
async fn export_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TaskRecord>>, RouteError> {
    state.resolve_subject(&headers).map_err(unauthorized_error)?;
    let tasks = state
        .task_service()
        .export_tasks()
        .await
        .map_err(service_error)?;
    Ok(Json(tasks.into_iter().map(TaskRecord::from).collect()))
}

/// POST /tasks/import - Bulk import, all-or-nothing
async fn import_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(records): Json<Vec<TaskRecord>>,
) -> Result<StatusCode, RouteError> {
    state.resolve_subject(&headers).map_err(unauthorized_error)?;
    let tasks = records
        .into_iter()
        .map(task_from_record)
        .collect::<Result<Vec<_>, _>>()?;
    state
        .task_service()
        .import_tasks(tasks)
        .await
        .map_err(service_error)?;
    Ok(StatusCode::CREATED)
}

fn unauthorized_error(err: crate::auth::AuthError) -> RouteError {
    unauthorized(err.to_string())
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(find_tasks).post(create_task))
        .route("/tasks/export", get(export_tasks))
        .route("/tasks/import", post(import_tasks))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record() -> TaskRecord {
        TaskRecord {
            id: "11111111-1111-1111-1111-111111111111".to_string(),
            title: "Fix login bug".to_string(),
            description: Some("Investigate and fix login issue".to_string()),
            status: "pending".to_string(),
            priority: "high".to_string(),
            due_date: "2025-02-02".to_string(),
            created_at: "2025-02-01".to_string(),
            updated_at: "2025-02-02".to_string(),
        }
    }

    #[test]
    fn test_task_record_round_trip() {
        let task = task_from_record(record()).unwrap();
        assert_eq!(task.title, "Fix login bug");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, "2025-02-02".parse::<NaiveDate>().unwrap());
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());

        let round_tripped = TaskRecord::from(task.clone());
        assert_eq!(task, task_from_record(round_tripped).unwrap());
    }

    #[test]
    fn test_task_from_record_rejects_bad_fields() {
        let mut bad_id = record();
        bad_id.id = "not-a-uuid".to_string();
        assert_eq!(task_from_record(bad_id).unwrap_err().0, StatusCode::BAD_REQUEST);

        let mut bad_status = record();
        bad_status.status = "todo".to_string();
        assert_eq!(
            task_from_record(bad_status).unwrap_err().0,
            StatusCode::BAD_REQUEST
        );

        let mut bad_date = record();
        bad_date.due_date = "02/02/2025".to_string();
        assert_eq!(
            task_from_record(bad_date).unwrap_err().0,
            StatusCode::BAD_REQUEST
        );

        // Due before creation violates the task invariant.
        let mut overdue_at_birth = record();
        overdue_at_birth.due_date = "2025-01-01".to_string();
        assert_eq!(
            task_from_record(overdue_at_birth).unwrap_err().0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_export_record_omits_missing_description() {
        let mut record = record();
        record.description = None;
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["due_date"], "2025-02-02");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_filter_from_query_parses_fields() {
        let filter = filter_from_query(FindTasksQuery {
            title: Some("re".to_string()),
            status: Some("in_progress".to_string()),
            priority: None,
            due_after: Some("2025-02-03".to_string()),
            due_before: Some("".to_string()),
        })
        .unwrap();

        assert_eq!(filter.title.as_deref(), Some("re"));
        assert_eq!(filter.status, Some(TaskStatus::InProgress));
        assert_eq!(filter.priority, None);
        assert_eq!(filter.due_after, Some("2025-02-03".parse().unwrap()));
        // An empty query value means the predicate is absent.
        assert_eq!(filter.due_before, None);
    }

    #[test]
    fn test_filter_from_query_rejects_unknown_enum() {
        let err = filter_from_query(FindTasksQuery {
            title: None,
            status: Some("archived".to_string()),
            priority: None,
            due_after: None,
            due_before: None,
        })
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_task_params_requires_valid_enums() {
        let req = TaskRequest {
            title: "foo".to_string(),
            description: None,
            status: "pending".to_string(),
            priority: "urgent".to_string(),
            due_date: "2025-02-02".to_string(),
        };
        assert_eq!(task_params(req).unwrap_err().0, StatusCode::BAD_REQUEST);
    }
}
