//! Report snapshot repository trait

use async_trait::async_trait;

use super::model::Report;
use crate::Result;

/// Storage for the singleton report snapshot.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Overwrite the snapshot with a freshly computed report.
    async fn save_report(&self, report: &Report) -> Result<()>;

    /// The last computed snapshot. Fails with `Error::ReportNotFound` until
    /// the first generation completes.
    async fn report(&self) -> Result<Report>;
}
