//! Term Cleanup: after an operation completes, delete every candidate
//! term whose item count is now zero.

use tracing::debug;

use crate::log::{LogAction, LogEntry, LogStatus};
use crate::operation::OperationSettings;
use crate::server::RuntimeServices;

/// Outcome of the post-completion cleanup pass.
#[derive(Debug, Clone, Default)]
pub struct CleanupOutcome {
    /// True when cleanup did not run at all (not requested, or nothing to
    /// check).
    pub skipped: bool,
    pub deleted: usize,
    pub errors: usize,
    pub details: Vec<String>,
}

/// Run the cleanup pass for a completed operation.
///
/// Counts are recomputed from live items before any emptiness check, since
/// item deletion does not update them synchronously. Terms that still have
/// items are left untouched and are not errors. Never fails the caller:
/// every failure is counted and logged.
pub async fn cleanup_empty_terms(
    services: &RuntimeServices,
    actor: &str,
    settings: &OperationSettings,
) -> CleanupOutcome {
    if !settings.delete_empty_terms {
        debug!(actor, "term cleanup not requested");
        return skip(services, actor, settings, "Term cleanup skipped: not requested.").await;
    }
    if settings.taxonomy.is_empty() || settings.candidate_term_ids.is_empty() {
        return skip(
            services,
            actor,
            settings,
            "Term cleanup skipped: no candidate terms.",
        )
        .await;
    }

    let taxonomy = &settings.taxonomy;
    let candidates = &settings.candidate_term_ids;

    if let Err(e) = services.terms.refresh_counts(candidates, taxonomy).await {
        let entry = LogEntry::new(
            LogAction::TermCleanup,
            LogStatus::Error,
            actor,
            format!("Term cleanup failed: could not refresh term counts: {e}"),
        )
        .with_criteria(settings.clone());
        services.logbook.record(entry).await;
        return CleanupOutcome {
            skipped: false,
            deleted: 0,
            errors: candidates.len(),
            details: vec![format!("Could not refresh term counts: {e}")],
        };
    }

    let mut deleted = 0usize;
    let mut errors = 0usize;
    let mut details = Vec::new();

    for &term_id in candidates {
        let term = match services.terms.get_term(term_id, taxonomy).await {
            Ok(Some(term)) => term,
            Ok(None) => {
                errors += 1;
                details.push(format!("Could not load term {term_id} for cleanup."));
                continue;
            }
            Err(e) => {
                errors += 1;
                details.push(format!("Could not load term {term_id} for cleanup: {e}"));
                continue;
            }
        };

        if term.count > 0 {
            continue;
        }

        match services.terms.delete_term(term_id, taxonomy).await {
            Ok(true) => {
                deleted += 1;
                details.push(format!("Deleted empty term: {} (id {term_id})", term.name));
            }
            Ok(false) => {
                errors += 1;
                details.push(format!(
                    "Failed to delete term {} (id {term_id})",
                    term.name
                ));
            }
            Err(e) => {
                errors += 1;
                details.push(format!(
                    "Failed to delete term {} (id {term_id}): {e}",
                    term.name
                ));
            }
        }
    }

    let status = if errors > 0 {
        LogStatus::Warning
    } else {
        LogStatus::Success
    };
    let entry = LogEntry::new(
        LogAction::TermCleanup,
        status,
        actor,
        format!("Empty term cleanup: {deleted} terms deleted, {errors} errors."),
    )
    .with_criteria(settings.clone())
    .with_counts(deleted as u64, errors as u64)
    .with_details(details.clone());
    services.logbook.record(entry).await;

    CleanupOutcome {
        skipped: false,
        deleted,
        errors,
        details,
    }
}

async fn skip(
    services: &RuntimeServices,
    actor: &str,
    settings: &OperationSettings,
    summary: &str,
) -> CleanupOutcome {
    let entry = LogEntry::new(LogAction::TermCleanup, LogStatus::Info, actor, summary)
        .with_criteria(settings.clone());
    services.logbook.record(entry).await;
    CleanupOutcome {
        skipped: true,
        ..Default::default()
    }
}
