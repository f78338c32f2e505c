//! Client-driven batch scheduler.
//!
//! Drives a previously found target ID set to completion: slices the
//! queue into fixed-size batches, dispatches them strictly in order, waits
//! a fixed pause between batches, and aggregates totals. A transport
//! failure on one dispatch counts the whole slice as errored and the loop
//! continues; no batch is ever retried.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::api::DeleteBatchResponse;

use super::SweepClient;
use super::error::Result as ClientResult;

// ============================================================================
// Transport Seam
// ============================================================================

/// One batch dispatch: a single bounded request/response exchange.
#[async_trait]
pub trait BatchTransport: Send + Sync {
    async fn dispatch(&self, ids: &[u64], is_last_batch: bool) -> ClientResult<DeleteBatchResponse>;
}

#[async_trait]
impl BatchTransport for SweepClient {
    async fn dispatch(&self, ids: &[u64], is_last_batch: bool) -> ClientResult<DeleteBatchResponse> {
        self.delete_batch(ids, is_last_batch).await
    }
}

// ============================================================================
// Scheduler Types
// ============================================================================

/// Conditions checked before the first batch is dispatched.
///
/// Deletion is irreversible, so the scheduler refuses to start in dry-run
/// mode or without the operator having confirmed.
#[derive(Debug, Clone, Copy)]
pub struct StartGate {
    pub dry_run: bool,
    pub confirmed: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("nothing to process")]
    NothingToProcess,

    #[error("dry run mode is active; no deletion was dispatched")]
    DryRunActive,

    #[error("operation was not confirmed; no deletion was dispatched")]
    NotConfirmed,
}

/// Progress snapshot emitted before each dispatch and once on completion.
///
/// `percent` is cumulative items planned so far over the total, so uneven
/// final batches still render monotonically increasing values; it reaches
/// 100 only with the completion report.
#[derive(Debug, Clone)]
pub struct SweepProgress {
    /// 1-based batch number. The completion report carries the final
    /// batch's number.
    pub batch: usize,
    pub total_batches: usize,
    pub percent: u8,
    pub total_items: usize,
    pub deleted: usize,
    pub errors: usize,
    pub message: String,
}

/// Final totals for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub attempted: usize,
    pub deleted: usize,
    pub errors: usize,
    pub batches: usize,
}

type PreBatchHook = Box<dyn Fn(&[u64]) + Send + Sync>;
type PostBatchHook = Box<dyn Fn(&[u64], Option<&DeleteBatchResponse>) + Send + Sync>;
type ProgressHook = Box<dyn Fn(&SweepProgress) + Send + Sync>;

// ============================================================================
// BatchScheduler
// ============================================================================

pub struct BatchScheduler<T: BatchTransport> {
    transport: T,
    batch_size: usize,
    pause: Duration,
    pre_batch: Vec<PreBatchHook>,
    post_batch: Vec<PostBatchHook>,
    progress: Option<ProgressHook>,
}

impl<T: BatchTransport> BatchScheduler<T> {
    pub fn new(transport: T, batch_size: usize, pause: Duration) -> Self {
        Self {
            transport,
            batch_size: batch_size.max(1),
            pause,
            pre_batch: Vec::new(),
            post_batch: Vec::new(),
            progress: None,
        }
    }

    /// Add a hook invoked synchronously before each batch dispatch.
    pub fn on_pre_batch(mut self, hook: impl Fn(&[u64]) + Send + Sync + 'static) -> Self {
        self.pre_batch.push(Box::new(hook));
        self
    }

    /// Add a hook invoked synchronously after each batch outcome.
    ///
    /// The response is `None` when the dispatch failed at transport level.
    pub fn on_post_batch(
        mut self,
        hook: impl Fn(&[u64], Option<&DeleteBatchResponse>) + Send + Sync + 'static,
    ) -> Self {
        self.post_batch.push(Box::new(hook));
        self
    }

    /// Set the progress observer.
    pub fn on_progress(mut self, hook: impl Fn(&SweepProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(hook));
        self
    }

    /// Process `ids` to completion.
    ///
    /// Returns the aggregated totals once the queue is empty. The only
    /// suspend points are the dispatch itself and the fixed inter-batch
    /// pause; there is no internal retry and no unbounded wait.
    pub async fn run(&self, ids: Vec<u64>, gate: StartGate) -> Result<SweepOutcome, SchedulerError> {
        if ids.is_empty() {
            return Err(SchedulerError::NothingToProcess);
        }
        if gate.dry_run {
            return Err(SchedulerError::DryRunActive);
        }
        if !gate.confirmed {
            return Err(SchedulerError::NotConfirmed);
        }

        let total_items = ids.len();
        let total_batches = total_items.div_ceil(self.batch_size);
        let mut queue: VecDeque<u64> = ids.into();
        let mut outcome = SweepOutcome::default();
        let mut dispatched = 0usize;

        while !queue.is_empty() {
            outcome.batches += 1;
            let take = self.batch_size.min(queue.len());
            let batch: Vec<u64> = queue.drain(..take).collect();
            let is_last_batch = queue.is_empty();

            self.emit(SweepProgress {
                batch: outcome.batches,
                total_batches,
                percent: percent_of(dispatched, total_items),
                total_items,
                deleted: outcome.deleted,
                errors: outcome.errors,
                message: format!(
                    "dispatching batch {}/{} ({} items)",
                    outcome.batches, total_batches, take
                ),
            });
            for hook in &self.pre_batch {
                hook(&batch);
            }

            let result = self.transport.dispatch(&batch, is_last_batch).await;
            dispatched += take;

            match &result {
                Ok(response) => {
                    outcome.deleted += response.deleted_count;
                    outcome.errors += response.error_count;
                    debug!(
                        batch = outcome.batches,
                        deleted = response.deleted_count,
                        errors = response.error_count,
                        "batch outcome"
                    );
                }
                Err(e) => {
                    // The whole slice is unaccounted for; count it as
                    // errored and keep going with the rest of the queue.
                    outcome.errors += take;
                    debug!(batch = outcome.batches, error = %e, "batch dispatch failed");
                }
            }
            for hook in &self.post_batch {
                hook(&batch, result.as_ref().ok());
            }

            if !queue.is_empty() && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        outcome.attempted = total_items;
        self.emit(SweepProgress {
            batch: outcome.batches,
            total_batches,
            percent: 100,
            total_items,
            deleted: outcome.deleted,
            errors: outcome.errors,
            message: format!(
                "complete: {} attempted, {} deleted, {} errors",
                outcome.attempted, outcome.deleted, outcome.errors
            ),
        });

        Ok(outcome)
    }

    fn emit(&self, progress: SweepProgress) {
        if let Some(hook) = &self.progress {
            hook(&progress);
        }
    }
}

fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total) as u8
}

// ============================================================================
// Tests
// ============================================================================
