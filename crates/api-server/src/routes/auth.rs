//! Auth API endpoints
//!
//! Registration and login, both returning a signed access token.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::error::{auth_error, RouteError};
use crate::auth::issue_token;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// POST /auth/register - Create a user and issue a token
async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), RouteError> {
    state
        .user_store()
        .create_user(&req.login, &req.password)
        .await
        .map_err(auth_error)?;
    let token = issue_token(state.jwt_secret(), req.login.trim(), state.token_ttl_hours())
        .map_err(auth_error)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

/// POST /auth/login - Verify credentials and issue a token
async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, RouteError> {
    state
        .user_store()
        .authenticate(&req.login, &req.password)
        .await
        .map_err(auth_error)?;
    let token = issue_token(state.jwt_secret(), req.login.trim(), state.token_ttl_hours())
        .map_err(auth_error)?;
    Ok(Json(AuthResponse { token }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}
