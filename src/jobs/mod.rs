//! Scheduled job runners.
//!
//! Each job talks to the API over HTTP through [`client::CrmClient`] and
//! reports into its own [`sink::LogSink`]. The [`Scheduler`] fires every job
//! on its own interval; a failed or panicking run is recorded in the job's
//! sink and the next tick still fires.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{task::JoinSet, time::MissedTickBehavior};

pub mod client;
pub mod heartbeat;
pub mod low_stock;
pub mod order_reminders;
pub mod sink;
pub mod weekly_report;

use sink::LogSink;

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    fn every(&self) -> Duration;

    fn sink(&self) -> &LogSink;

    async fn run(&self) -> anyhow::Result<()>;
}

pub fn failure_line(stamp: &str, job: &str, error: &str) -> String {
    format!("{stamp} {job} failed: {error}")
}

/// Runs `job` once in its own task. Returns whether the run succeeded; a
/// failure is logged and appended to the job's sink.
pub async fn run_guarded(job: Arc<dyn Job>) -> bool {
    let name = job.name();
    let task = {
        let job = Arc::clone(&job);
        tokio::spawn(async move { job.run().await })
    };

    let error = match task.await {
        Ok(Ok(())) => {
            tracing::debug!(job = name, "job run finished");
            return true;
        }
        Ok(Err(err)) => format!("{err:#}"),
        Err(join_err) if join_err.is_panic() => "run panicked".to_string(),
        Err(join_err) => join_err.to_string(),
    };

    tracing::error!(job = name, error = %error, "job run failed");
    let line = failure_line(&job.sink().stamp_now(), name, &error);
    if let Err(err) = job.sink().append(&[line]).await {
        tracing::error!(job = name, error = %err, sink = %job.sink().path().display(), "cannot write job sink");
    }
    false
}

#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<Arc<dyn Job>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, job: impl Job + 'static) -> Self {
        self.jobs.push(Arc::new(job));
        self
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|job| job.name()).collect()
    }

    /// Runs the named job once.
    pub async fn run_once(&self, name: &str) -> anyhow::Result<bool> {
        let job = self
            .jobs
            .iter()
            .find(|job| job.name() == name)
            .ok_or_else(|| anyhow::anyhow!("unknown job {name:?}"))?;
        Ok(run_guarded(Arc::clone(job)).await)
    }

    /// Ticks every job until `shutdown` resolves. The first tick of each job
    /// fires immediately.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut loops = JoinSet::new();
        for job in self.jobs {
            tracing::info!(job = job.name(), every_secs = job.every().as_secs(), "job scheduled");
            loops.spawn(async move {
                let mut ticker = tokio::time::interval(job.every());
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    run_guarded(Arc::clone(&job)).await;
                }
            });
        }

        shutdown.await;
        tracing::info!("scheduler stopping");
        loops.shutdown().await;
    }
}
