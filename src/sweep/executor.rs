//! Batch Executor: deletes one batch of items and, on the last batch,
//! triggers the post-completion term cleanup.

use tracing::{debug, warn};

use crate::log::{LogAction, LogEntry, LogStatus};
use crate::server::RuntimeServices;

use super::error::SweepError;
use super::term_cleanup::cleanup_empty_terms;

/// How many batch IDs the log summary samples.
const SAMPLED_IDS: usize = 5;

/// Outcome of one batch call.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub deleted: usize,
    pub errors: usize,
    /// One line per item, success or failure.
    pub details: Vec<String>,
    /// Present only when this was the operation's last batch.
    pub final_message: Option<String>,
}

/// Delete every item in `ids`, independently.
///
/// One item's failure never blocks the rest of the batch. When
/// `is_last_batch` is set, the persisted operation state is consumed: term
/// cleanup runs against it and both the settings and the target ID set are
/// cleared regardless of the cleanup outcome.
pub async fn process_batch(
    services: &RuntimeServices,
    actor: &str,
    ids: &[u64],
    is_last_batch: bool,
) -> Result<BatchOutcome, SweepError> {
    if ids.is_empty() {
        return Err(SweepError::EmptyBatch);
    }

    // An expired or missing operation degrades to empty settings: deletion
    // still proceeds, the cleanup below becomes a no-op.
    let settings = services.operations.settings_for(actor).unwrap_or_default();

    let mut deleted = 0usize;
    let mut errors = 0usize;
    let mut details = Vec::with_capacity(ids.len());

    for &id in ids {
        let title = match services.content.title(id).await {
            Ok(title) => title.unwrap_or_default(),
            Err(e) => {
                warn!(item = id, error = %e, "failed to load item title");
                String::new()
            }
        };
        match services.content.delete_item(id).await {
            Ok(true) => {
                deleted += 1;
                details.push(format!("Deleted \"{title}\" (id {id})"));
            }
            Ok(false) => {
                errors += 1;
                details.push(format!("Failed to delete \"{title}\" (id {id})"));
            }
            Err(e) => {
                errors += 1;
                details.push(format!("Failed to delete \"{title}\" (id {id}): {e}"));
            }
        }
    }

    let sample: Vec<String> = ids.iter().take(SAMPLED_IDS).map(u64::to_string).collect();
    let status = if deleted > 0 {
        LogStatus::Success
    } else {
        LogStatus::Info
    };
    let entry = LogEntry::new(
        LogAction::DeleteBatch,
        status,
        actor,
        format!(
            "Batch processed: {} attempted, {} deleted. Sample IDs: {}",
            ids.len(),
            deleted,
            sample.join(", ")
        ),
    )
    .with_criteria(settings.clone())
    .with_attempted(ids.len() as u64)
    .with_counts(deleted as u64, errors as u64)
    .with_details(details.clone());
    services.logbook.record(entry).await;

    let final_message = if is_last_batch {
        // Take the state first so it is gone no matter how cleanup fares.
        let state = services.operations.take(actor);
        let targets = state.as_ref().map(|s| s.target_ids.len()).unwrap_or(0);
        debug!(actor, targets, "last batch complete, running post-completion cleanup");
        let cleanup_settings = state.map(|s| s.settings).unwrap_or(settings);
        cleanup_empty_terms(services, actor, &cleanup_settings).await;
        Some("All batches processed. Term cleanup (if enabled) has run.".to_string())
    } else {
        None
    };

    Ok(BatchOutcome {
        attempted: ids.len(),
        deleted,
        errors,
        details,
        final_message,
    })
}
