//! Queue refresh and elapsed-time extrapolation loop.

use slurmdash_slurm::Scheduler;
use slurmdash_state::{DashboardConfig, QueueSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Keeps a [`QueueSnapshot`] current on two independent cadences.
pub struct PollingService {
    scheduler: Arc<dyn Scheduler>,
    config: DashboardConfig,
    snapshot: Arc<Mutex<QueueSnapshot>>,
}

fn ticker(period: Option<Duration>) -> Option<Interval> {
    period.map(|p| {
        let mut ticker = interval(p);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    })
}

/// Wait for the next tick, or forever when the cadence is disabled.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl PollingService {
    pub fn new(scheduler: Arc<dyn Scheduler>, config: DashboardConfig) -> Self {
        Self {
            scheduler,
            config,
            snapshot: Arc::new(Mutex::new(QueueSnapshot::new(Vec::new()))),
        }
    }

    /// Fetch the queue and replace the snapshot.
    ///
    /// A failed fetch shows an empty queue until the next refresh.
    pub async fn refresh(&self) {
        let jobs = match self.scheduler.get_queue().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!("Error fetching job queue: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Fetched {} jobs", jobs.len());

        let snapshot = QueueSnapshot::sorted(jobs, self.config.sort_by.as_deref());
        *self.snapshot.lock().await = snapshot;
    }

    /// Advance displayed elapsed times, returning the changed indices.
    pub async fn extrapolate(&self) -> Vec<usize> {
        self.snapshot.lock().await.extrapolate()
    }

    /// Run until interrupted, calling `on_change` whenever the snapshot
    /// changes.
    pub async fn run<F>(self, mut on_change: F)
    where
        F: FnMut(&QueueSnapshot),
    {
        let mut refresh_ticker = ticker(self.config.refresh_interval());
        let mut extrapolation_ticker = ticker(self.config.extrapolation_interval());

        // The refresh ticker's immediate first tick performs the initial
        // fetch; the extrapolation ticker's is skipped.
        if refresh_ticker.is_none() {
            self.refresh().await;
            on_change(&*self.snapshot.lock().await);
        }
        if let Some(ticker) = extrapolation_ticker.as_mut() {
            ticker.tick().await;
        }

        loop {
            tokio::select! {
                _ = next_tick(&mut refresh_ticker) => {
                    self.refresh().await;
                    on_change(&*self.snapshot.lock().await);
                }
                _ = next_tick(&mut extrapolation_ticker) => {
                    if !self.extrapolate().await.is_empty() {
                        on_change(&*self.snapshot.lock().await);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, stopping");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use camino::Utf8Path;
    use slurmdash_slurm::{FixtureScheduler, Job, SchedulerError};

    struct UnreachableScheduler;

    #[async_trait]
    impl Scheduler for UnreachableScheduler {
        async fn get_queue(&self) -> Result<Vec<Job>, SchedulerError> {
            Err(SchedulerError::NotFound("squeue".into()))
        }

        async fn cancel_job(&self, job: &Job) -> Result<(), SchedulerError> {
            Err(SchedulerError::NotFound(job.id.clone()))
        }

        async fn submit_job(&self, script: &Utf8Path) -> Result<String, SchedulerError> {
            Err(SchedulerError::InvalidScript(script.to_string()))
        }

        async fn get_job_output_path(&self, _job: &Job) -> Result<Option<String>, SchedulerError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_refresh_sorts_fetched_queue() {
        let config = DashboardConfig {
            sort_by: Some("name".into()),
            ..Default::default()
        };
        let service = PollingService::new(Arc::new(FixtureScheduler::default()), config);
        service.refresh().await;

        let snapshot = service.snapshot.lock().await;
        assert_eq!(snapshot.jobs().len(), 9);
        assert_eq!(snapshot.jobs()[0].name, "job1");
        assert_eq!(snapshot.roots().len(), 7);
    }

    #[tokio::test]
    async fn test_failed_refresh_shows_empty_queue() {
        let service = PollingService::new(Arc::new(UnreachableScheduler), DashboardConfig::default());
        service.refresh().await;
        assert!(service.snapshot.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_cadence_never_ticks() {
        let mut disabled = ticker(None);
        let waited =
            tokio::time::timeout(Duration::from_millis(20), next_tick(&mut disabled)).await;
        assert!(waited.is_err());
    }
}
