//! Redis-backed report snapshot storage

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::model::Report;
use super::repository::ReportRepository;
use crate::{Error, Result};

const REPORT_KEY: &str = "analytics:report";

/// Stores the singleton report as JSON bytes under a fixed key.
#[derive(Clone)]
pub struct RedisReportStore {
    conn: MultiplexedConnection,
}

impl RedisReportStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ReportRepository for RedisReportStore {
    async fn save_report(&self, report: &Report) -> Result<()> {
        let bytes = serde_json::to_vec(report)?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(REPORT_KEY, bytes).await?;
        Ok(())
    }

    async fn report(&self) -> Result<Report> {
        let mut conn = self.conn.clone();
        let bytes: Option<Vec<u8>> = conn.get(REPORT_KEY).await?;
        match bytes {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Err(Error::ReportNotFound),
        }
    }
}
