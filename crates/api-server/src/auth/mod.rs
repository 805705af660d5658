//! Authentication: JWT issuance/verification and the user credential store.
//!
//! The task and analytics services never see identity; handlers resolve the
//! verified subject here and proceed.

mod jwt;
mod store;

use thiserror::Error;

pub use jwt::{issue_token, resolve_subject, verify_token, Claims};
pub use store::PgUserStore;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}
