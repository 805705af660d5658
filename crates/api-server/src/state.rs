//! Application state

use std::sync::Arc;

use axum::http::HeaderMap;

use tasks_core::analytics::AnalyticsService;
use tasks_core::task::TaskService;

use crate::auth::{self, AuthError, PgUserStore};
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    tasks: Arc<TaskService>,
    analytics: Arc<AnalyticsService>,
    users: PgUserStore,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AppState {
    pub fn new(
        tasks: Arc<TaskService>,
        analytics: Arc<AnalyticsService>,
        users: PgUserStore,
        config: &Config,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                tasks,
                analytics,
                users,
                jwt_secret: config.jwt_secret.clone(),
                token_ttl_hours: config.token_ttl_hours,
            }),
        }
    }

    pub fn task_service(&self) -> &TaskService {
        &self.inner.tasks
    }

    pub fn analytics_service(&self) -> &AnalyticsService {
        &self.inner.analytics
    }

    pub fn user_store(&self) -> &PgUserStore {
        &self.inner.users
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner.jwt_secret
    }

    pub fn token_ttl_hours(&self) -> i64 {
        self.inner.token_ttl_hours
    }

    /// Resolve the verified caller identity for a protected route.
    pub fn resolve_subject(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        auth::resolve_subject(headers, &self.inner.jwt_secret)
    }
}
