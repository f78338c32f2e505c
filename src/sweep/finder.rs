//! Item Finder: resolves selection criteria into the ordered target ID
//! set and the candidate terms for post-completion cleanup.

use tracing::debug;

use crate::log::{LogAction, LogEntry, LogStatus};
use crate::operation::OperationSettings;
use crate::server::RuntimeServices;
use crate::store::ItemQuery;

use super::error::SweepError;

/// Strategy hook applied to the resolved item query before execution.
pub type QueryFilter = dyn Fn(ItemQuery) -> ItemQuery + Send + Sync;

/// Selection criteria for one Find call.
#[derive(Debug, Clone)]
pub struct FindCriteria {
    pub content_type: String,
    pub taxonomy: String,
    pub term_filter: String,
    pub delete_empty_terms: bool,
}

#[derive(Debug, Clone)]
pub struct FoundItem {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct FindOutcome {
    /// Human-readable lines about what matched.
    pub messages: Vec<String>,
    pub items: Vec<FoundItem>,
}

impl FindOutcome {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Resolve `criteria` into a target ID set for `actor`.
///
/// On a non-empty result the operation settings and target IDs are
/// persisted (replacing any previous operation of this actor); a
/// zero-result Find clears them instead. A log entry is appended either
/// way. Validation failures leave all state untouched.
pub async fn find_items(
    services: &RuntimeServices,
    actor: &str,
    criteria: FindCriteria,
    query_filter: Option<&QueryFilter>,
) -> Result<FindOutcome, SweepError> {
    let content_type = validate_selection(services, &criteria).await?;
    debug!(
        content_type = %content_type.id,
        taxonomy = %criteria.taxonomy,
        term_filter = %criteria.term_filter,
        "resolving find criteria"
    );

    let mut settings = OperationSettings {
        content_type: criteria.content_type.clone(),
        taxonomy: criteria.taxonomy.clone(),
        term_filter: criteria.term_filter.clone(),
        delete_empty_terms: criteria.delete_empty_terms,
        candidate_term_ids: Vec::new(),
    };

    let mut messages = Vec::new();
    let filter = criteria.term_filter.trim().to_lowercase();

    // Resolve the term restriction. A non-empty filter narrows the query to
    // the matching terms; no match at all is a zero-result outcome, not an
    // error.
    let target_term_ids: Option<Vec<u64>> = if filter.is_empty() {
        messages.push("No term filter applied; considering all terms of the taxonomy.".to_string());
        if criteria.delete_empty_terms {
            let all_terms = services.terms.list_terms(&criteria.taxonomy).await?;
            settings.candidate_term_ids = all_terms.iter().map(|t| t.id).collect();
        }
        None
    } else {
        let all_terms = services.terms.list_terms(&criteria.taxonomy).await?;
        let mut matched = Vec::new();
        for term in &all_terms {
            if term.name.to_lowercase().contains(&filter) || term.slug.to_lowercase().contains(&filter)
            {
                matched.push(term.id);
                messages.push(format!(
                    "Matched term by filter \"{}\": {} (slug: {})",
                    criteria.term_filter, term.name, term.slug
                ));
            }
        }

        if matched.is_empty() {
            messages.push(format!(
                "No terms found in taxonomy \"{}\" with \"{}\" in their name or slug.",
                criteria.taxonomy, criteria.term_filter
            ));
            services.operations.clear(actor);
            let outcome = FindOutcome {
                messages,
                items: Vec::new(),
            };
            log_find(services, actor, &settings, &outcome).await;
            return Ok(outcome);
        }

        settings.candidate_term_ids = matched.clone();
        Some(matched)
    };

    let mut query = ItemQuery {
        content_type: criteria.content_type.clone(),
        taxonomy: criteria.taxonomy.clone(),
        term_ids: target_term_ids,
    };
    if let Some(adjust) = query_filter {
        query = adjust(query);
    }

    let ids = services.content.find_ids(&query).await?;
    let mut items = Vec::with_capacity(ids.len());
    for id in ids {
        let title = services.content.title(id).await?.unwrap_or_default();
        items.push(FoundItem { id, title });
    }

    if items.is_empty() {
        messages.push("No items matched the criteria.".to_string());
        services.operations.clear(actor);
    } else {
        messages.push(format!("Found {} items to process.", items.len()));
        let target_ids = items.iter().map(|item| item.id).collect();
        services.operations.put(actor, settings.clone(), target_ids);
    }

    let outcome = FindOutcome { messages, items };
    log_find(services, actor, &settings, &outcome).await;
    Ok(outcome)
}

/// Validate the (content type, taxonomy) pairing against the catalog.
async fn validate_selection(
    services: &RuntimeServices,
    criteria: &FindCriteria,
) -> Result<crate::store::ContentType, SweepError> {
    let Some(content_type) = services.content.get_type(&criteria.content_type).await? else {
        return Err(SweepError::InvalidSelection(format!(
            "Unknown content type \"{}\".",
            criteria.content_type
        )));
    };
    if !services.content.taxonomy_exists(&criteria.taxonomy).await? {
        return Err(SweepError::InvalidSelection(format!(
            "Unknown taxonomy \"{}\".",
            criteria.taxonomy
        )));
    }
    if !content_type
        .taxonomies
        .iter()
        .any(|t| t.id == criteria.taxonomy)
    {
        return Err(SweepError::InvalidSelection(format!(
            "Taxonomy \"{}\" is not registered for content type \"{}\".",
            criteria.taxonomy, criteria.content_type
        )));
    }
    Ok(content_type)
}

async fn log_find(
    services: &RuntimeServices,
    actor: &str,
    settings: &OperationSettings,
    outcome: &FindOutcome,
) {
    let summary = if outcome.items.is_empty() {
        "No items matched the criteria.".to_string()
    } else {
        format!("Found {} items.", outcome.items.len())
    };
    let entry = LogEntry::new(LogAction::Find, LogStatus::Info, actor, summary)
        .with_criteria(settings.clone())
        .with_found(outcome.items.len() as u64)
        .with_details(outcome.messages.clone());
    services.logbook.record(entry).await;
}
