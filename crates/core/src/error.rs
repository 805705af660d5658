//! Error types for the core library

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("title must not be empty")]
    InvalidTitle,

    #[error("due date must not precede the creation date")]
    InvalidDueDate,

    #[error("invalid status: {0:?}")]
    InvalidStatus(String),

    #[error("invalid priority: {0:?}")]
    InvalidPriority(String),

    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("task {0} has already been completed")]
    TaskAlreadyDone(Uuid),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("report has not been generated yet")]
    ReportNotFound,

    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Whether the failure was caused by the caller (safe to surface as 4xx)
    /// as opposed to the infrastructure (5xx, logged at error severity).
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
