//! Task module
//!
//! Task model, filtering, persistence and the service that ties them
//! together.

mod model;
mod pg_store;
mod query;
mod repository;
mod service;

pub use model::{Task, TaskParams, TaskPriority, TaskStatus, TasksFilter};
pub use pg_store::PgTaskStore;
pub use repository::TaskRepository;
pub use service::TaskService;
