//! HTTP error mapping
//!
//! Translates the core error taxonomy into status codes and logs at the
//! severity the classification calls for: expected failures are routine
//! (debug), storage failures are infrastructure incidents (error) and their
//! detail stays out of the response body.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use tasks_core::Error;

use crate::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

pub fn unauthorized(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, error)
}

pub fn service_error(err: Error) -> RouteError {
    if err.is_expected() {
        tracing::debug!(error = %err, "request failed");
    } else {
        tracing::error!(error = %err, "request failed");
    }
    match err {
        Error::InvalidTitle
        | Error::InvalidDueDate
        | Error::InvalidStatus(_)
        | Error::InvalidPriority(_) => route_error(StatusCode::BAD_REQUEST, err.to_string()),
        Error::TaskNotFound(_) | Error::ReportNotFound => {
            route_error(StatusCode::NOT_FOUND, err.to_string())
        }
        Error::TaskAlreadyDone(_) | Error::Conflict(_) => {
            route_error(StatusCode::CONFLICT, err.to_string())
        }
        Error::Storage(_) => route_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    }
}

pub fn auth_error(err: AuthError) -> RouteError {
    match err {
        AuthError::InvalidInput(_) => {
            tracing::debug!(error = %err, "auth request failed");
            route_error(StatusCode::BAD_REQUEST, err.to_string())
        }
        AuthError::Unauthorized(_) => {
            tracing::debug!(error = %err, "auth request failed");
            route_error(StatusCode::UNAUTHORIZED, err.to_string())
        }
        AuthError::Conflict(_) => {
            tracing::debug!(error = %err, "auth request failed");
            route_error(StatusCode::CONFLICT, err.to_string())
        }
        AuthError::Storage(_) => {
            tracing::error!(error = %err, "auth request failed");
            route_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}
