//! Analytics module
//!
//! Aggregate report computation and snapshot storage.

mod model;
mod redis_store;
mod repository;
mod service;

pub use model::Report;
pub use redis_store::RedisReportStore;
pub use repository::ReportRepository;
pub use service::AnalyticsService;
