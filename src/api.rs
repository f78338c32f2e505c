//! Wire types shared by the HTTP handlers and the client.

use serde::{Deserialize, Serialize};

/// Request header naming the operator driving an operation.
///
/// Server-side operation state is keyed by this value, so two different
/// operators never clobber each other's in-flight operation.
pub const ACTOR_HEADER: &str = "x-bulksweep-actor";

/// Actor assumed when the header is absent.
pub const DEFAULT_ACTOR: &str = "admin";

// ============================================================================
// Find
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindRequest {
    pub content_type: String,
    pub taxonomy: String,
    /// Case-insensitive substring matched against term name or slug.
    /// Empty means every term of the taxonomy.
    #[serde(default)]
    pub term_filter: String,
    /// Delete terms left empty once the whole operation completes.
    #[serde(default)]
    pub delete_empty_terms: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub posts: Vec<PostSummary>,
    #[serde(default)]
    pub count: usize,
}

// ============================================================================
// DeleteBatch
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBatchRequest {
    pub ids: Vec<u64>,
    /// Set by the client on the batch that drains its queue; triggers the
    /// post-completion term cleanup server-side.
    pub is_last_batch: bool,
}

/// Batch outcome envelope.
///
/// `success` is false whenever any item in the batch failed, but the counts
/// and details are always populated; callers must read the counts rather
/// than the flag alone to track accurate totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBatchResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub deleted_count: usize,
    #[serde(default)]
    pub error_count: usize,
    #[serde(default)]
    pub details: Vec<String>,
    /// Present only on the last batch of an operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_operation_message: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomySummary {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTypeSummary {
    pub id: String,
    pub label: String,
    pub taxonomies: Vec<TaxonomySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTypesResponse {
    pub types: Vec<ContentTypeSummary>,
}

// ============================================================================
// Logs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntryResponse {
    pub id: String,
    pub timestamp: String,
    pub action: String,
    pub status: String,
    pub acting_user: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u64>,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListLogsResponse {
    pub entries: Vec<LogEntryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeLogsResponse {
    pub removed: usize,
}
