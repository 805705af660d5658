//! Background maintenance scheduling
//!
//! Two independent periodic jobs run alongside the serving path: overdue-task
//! pruning and analytics report generation. Each job is its own tokio task
//! with its own timer; a failed invocation is logged and the schedule
//! continues. Cancellation is cooperative and checked between ticks only, so
//! an in-flight invocation always finishes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::analytics::AnalyticsService;
use crate::task::TaskService;

const PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const REPORT_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Job intervals, injectable for tests. Defaults are the production cadence.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub prune_interval: Duration,
    pub report_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            prune_interval: PRUNE_INTERVAL,
            report_interval: REPORT_INTERVAL,
        }
    }
}

/// Handle over the running periodic jobs. Dropping it without calling
/// [`Scheduler::shutdown`] also stops the jobs at their next tick.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn start(tasks: Arc<TaskService>, analytics: Arc<AnalyticsService>) -> Self {
        Self::start_with(tasks, analytics, SchedulerConfig::default())
    }

    pub fn start_with(
        tasks: Arc<TaskService>,
        analytics: Arc<AnalyticsService>,
        config: SchedulerConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);

        let prune = tokio::spawn(run_job(
            "prune_overdue_tasks",
            config.prune_interval,
            shutdown.subscribe(),
            move || {
                let tasks = Arc::clone(&tasks);
                async move { tasks.prune_overdue_tasks().await }
            },
        ));
        let report = tokio::spawn(run_job(
            "generate_report",
            config.report_interval,
            shutdown.subscribe(),
            move || {
                let analytics = Arc::clone(&analytics);
                async move { analytics.generate_report().await }
            },
        ));

        Self {
            shutdown,
            handles: vec![prune, report],
        }
    }

    /// Signal both jobs to stop and wait for them to finish. An invocation
    /// already in flight completes before its task exits.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn run_job<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    job: F,
) where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = crate::Result<()>> + Send + 'static,
{
    // First fire happens one full period after start, ticker-style.
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::debug!(job = name, "stopping periodic job");
                return;
            }
            _ = ticker.tick() => {
                if let Err(err) = job().await {
                    tracing::error!(job = name, error = %err, "periodic job failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::task::TaskRepository;
    use crate::task::{Task, TaskPriority, TaskStatus};
    use crate::test_support::{MemoryReportStore, MemoryTaskStore};

    fn fixture(
        store: Arc<MemoryTaskStore>,
    ) -> (Arc<TaskService>, Arc<AnalyticsService>) {
        let tasks = Arc::new(TaskService::new(store.clone()));
        let analytics = Arc::new(AnalyticsService::new(
            store,
            Arc::new(MemoryReportStore::new()),
        ));
        (tasks, analytics)
    }

    fn overdue_task() -> Task {
        let created_at = Utc::now() - chrono::Duration::days(30);
        Task::new(
            Uuid::new_v4(),
            "stale",
            None,
            TaskStatus::Pending,
            TaskPriority::Low,
            (Utc::now() - chrono::Duration::days(10)).date_naive(),
            created_at,
            created_at,
        )
        .unwrap()
    }

    fn config(prune_secs: u64, report_secs: u64) -> SchedulerConfig {
        SchedulerConfig {
            prune_interval: Duration::from_secs(prune_secs),
            report_interval: Duration::from_secs(report_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_job_fires_after_one_period() {
        let store = Arc::new(MemoryTaskStore::new());
        store.save(&overdue_task()).await.unwrap();
        let (tasks, analytics) = fixture(store.clone());

        let scheduler = Scheduler::start_with(tasks, analytics, config(60, 3600));

        // Not yet: the first tick comes one full period after start.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.all().await.unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(store.all().await.unwrap().is_empty());

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_job_failure_keeps_the_schedule() {
        let store = Arc::new(MemoryTaskStore::new());
        let (tasks, analytics) = fixture(store.clone());

        store.fail_storage(true).await;
        let scheduler = Scheduler::start_with(tasks, analytics.clone(), config(3600, 60));

        // First tick fails; the loop must survive it.
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(analytics.report().await.is_err());

        store.fail_storage(false).await;
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(analytics.report().await.is_ok());

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_both_jobs() {
        let store = Arc::new(MemoryTaskStore::new());
        store.save(&overdue_task()).await.unwrap();
        let (tasks, analytics) = fixture(store.clone());

        let scheduler = Scheduler::start_with(tasks, analytics.clone(), config(60, 60));
        scheduler.shutdown().await;

        // No tick fires after shutdown resolved.
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(store.all().await.unwrap().len(), 1);
        assert!(analytics.report().await.is_err());
    }
}
