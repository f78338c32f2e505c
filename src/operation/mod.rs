//! Per-operator operation state: what a Find resolved, held until the
//! batched deletion completes or the state expires.

mod registry;

pub use registry::OperationRegistry;

use serde::{Deserialize, Serialize};

/// Selection criteria captured by a Find, carried through every batch of
/// the operation and consumed by the final term cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSettings {
    pub content_type: String,
    pub taxonomy: String,
    pub term_filter: String,
    pub delete_empty_terms: bool,
    /// Terms eligible for deletion once the operation completes: the
    /// filter-matched terms, or every term of the taxonomy when cleanup was
    /// requested without a filter.
    pub candidate_term_ids: Vec<u64>,
}

/// One operator's in-flight operation: the settings plus the full ordered
/// target ID set. Both live and die together.
#[derive(Debug, Clone)]
pub struct OperationState {
    pub settings: OperationSettings,
    pub target_ids: Vec<u64>,
}
