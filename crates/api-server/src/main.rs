//! API server for the tasks service
//!
//! Boots the Postgres pool and Redis connection, runs migrations, starts the
//! background scheduler, and serves the REST API until a shutdown signal
//! arrives.

mod auth;
mod config;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tasks_core::analytics::{AnalyticsService, RedisReportStore};
use tasks_core::scheduler::Scheduler;
use tasks_core::task::{PgTaskStore, TaskRepository, TaskService};

use crate::auth::PgUserStore;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=debug,tasks_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let redis_client =
        redis::Client::open(config.redis_url.as_str()).context("failed to parse redis url")?;
    let redis_conn = redis_client
        .get_multiplexed_tokio_connection()
        .await
        .context("failed to connect to redis")?;

    let tasks_repo: Arc<dyn TaskRepository> = Arc::new(PgTaskStore::new(pool.clone()));
    let task_service = Arc::new(TaskService::new(Arc::clone(&tasks_repo)));
    let analytics_service = Arc::new(AnalyticsService::new(
        tasks_repo,
        Arc::new(RedisReportStore::new(redis_conn)),
    ));

    let scheduler = Scheduler::start(Arc::clone(&task_service), Arc::clone(&analytics_service));

    let state = AppState::new(
        task_service,
        analytics_service,
        PgUserStore::new(pool),
        &config,
    );

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::task::router())
        .merge(routes::analytics::router())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("REST API listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Let an in-flight background tick finish before the process exits.
    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}
