//! 後台任務模組
//!
//! Periodic jobs driven by `run_job_loop`. A job only has to say what one run
//! does; the loop owns the cadence, the per-run correlation id, error
//! logging and shutdown.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};
use uuid::Uuid;

pub mod ranking_job;

pub use ranking_job::RankingRefreshJob;

/// Unified interface of a scheduled job
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// 任務名稱(用於日誌)
    fn name(&self) -> &str;

    async fn run(&self, correlation_id: &str) -> Result<()>;
}

/// When a job fires
#[derive(Debug, Clone, Copy)]
pub struct JobSchedule {
    pub interval: Duration,
    pub initial_delay: Duration,
}

/// Run a job once, logging start, failure and elapsed time.
///
/// Returns whether the run succeeded. Errors never propagate to the caller.
pub async fn run_once(job: &dyn ScheduledJob) -> bool {
    let correlation_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    info!(job_name = %job.name(), correlation_id = %correlation_id, "Job started");

    let result = job.run(&correlation_id).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            info!(
                job_name = %job.name(),
                correlation_id = %correlation_id,
                elapsed_ms,
                "Job finished"
            );
            true
        }
        Err(e) => {
            error!(
                job_name = %job.name(),
                correlation_id = %correlation_id,
                error = %e,
                elapsed_ms,
                "Job failed, will run again on next tick"
            );
            false
        }
    }
}

/// 運行單個 job 的定時循環
///
/// Runs are sequential: a tick that comes due while a run is still going is
/// skipped instead of queued. Stops at the next shutdown signal.
pub async fn run_job_loop(
    job: Arc<dyn ScheduledJob>,
    schedule: JobSchedule,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + schedule.initial_delay, schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        job_name = %job.name(),
        interval_secs = schedule.interval.as_secs(),
        initial_delay_secs = schedule.initial_delay.as_secs(),
        "Starting job loop"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_once(job.as_ref()).await;
            }
            _ = shutdown.recv() => {
                info!(job_name = %job.name(), "Received shutdown signal, stopping job loop");
                break;
            }
        }
    }

    info!(job_name = %job.name(), "Job loop stopped");
}
