//! Scheduled retention sweep for the activity log.
//!
//! Runs as a background task: sleeps until the next cron occurrence, purges
//! entries older than the retention period, logs the run, repeats. The
//! sweeper is not started at all when retention is 0 (keep forever).

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::log::{ActivityLog, LogAction, LogEntry, LogStatus};

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    cancel: Option<oneshot::Sender<()>>,
}

impl SweeperHandle {
    /// Stop the sweeper. A sweep already in progress finishes first.
    pub fn stop(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

/// Parse and validate a 7-field cron expression.
pub fn parse_schedule(expr: &str) -> Result<cron::Schedule, String> {
    cron::Schedule::from_str(expr).map_err(|e| e.to_string())
}

/// Start the retention sweeper, logging the scheduling decision.
///
/// Returns `None` when retention is 0: nothing is scheduled and entries
/// are kept forever.
pub async fn start(
    logbook: ActivityLog,
    retention_days: u32,
    schedule: cron::Schedule,
) -> Option<SweeperHandle> {
    if retention_days == 0 {
        info!("log retention sweep disabled (keep forever)");
        logbook
            .record(LogEntry::new(
                LogAction::CronSchedule,
                LogStatus::Info,
                "system",
                "Retention sweep not scheduled: retention period is set to keep logs forever.",
            ))
            .await;
        return None;
    }

    info!(retention_days, "log retention sweep scheduled");
    logbook
        .record(LogEntry::new(
            LogAction::CronSchedule,
            LogStatus::Info,
            "system",
            format!("Retention sweep scheduled; entries older than {retention_days} days will be removed."),
        ))
        .await;

    let (cancel_tx, mut cancel_rx) = oneshot::channel();

    tokio::spawn(async move {
        loop {
            let Some(next) = schedule.after(&Utc::now()).next() else {
                warn!("retention schedule has no future occurrence, sweeper exiting");
                break;
            };
            let delay = next
                .signed_duration_since(Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            debug!(next_run = %next, "retention sweeper sleeping");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    run_sweep(&logbook, retention_days, "system").await;
                }
                _ = &mut cancel_rx => {
                    debug!("retention sweeper cancelled");
                    break;
                }
            }
        }
    });

    Some(SweeperHandle {
        cancel: Some(cancel_tx),
    })
}

/// Purge entries past the retention period and log the run.
///
/// Shared by the scheduled sweep and the manual purge endpoint. Returns
/// the number of entries removed, or `None` when the purge itself failed.
pub async fn run_sweep(logbook: &ActivityLog, retention_days: u32, actor: &str) -> Option<usize> {
    match logbook.purge_older_than(retention_days).await {
        Ok(removed) => {
            info!(removed, retention_days, "retention sweep complete");
            logbook
                .record(
                    LogEntry::new(
                        LogAction::CronCleanup,
                        LogStatus::Success,
                        actor,
                        format!("Retention sweep: {removed} old log entries removed."),
                    )
                    .with_counts(removed as u64, 0),
                )
                .await;
            Some(removed)
        }
        Err(e) => {
            warn!(error = %e, "retention sweep failed");
            logbook
                .record(LogEntry::new(
                    LogAction::CronCleanup,
                    LogStatus::Error,
                    actor,
                    format!("Retention sweep failed: {e}"),
                ))
                .await;
            None
        }
    }
}
