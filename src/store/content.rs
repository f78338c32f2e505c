//! Content catalog and item storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::StorageResult;

/// A taxonomy associated with a content type, as shown in selection UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRef {
    pub id: String,
    pub label: String,
}

/// A deletable content type together with its usable taxonomies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentType {
    pub id: String,
    pub label: String,
    pub taxonomies: Vec<TaxonomyRef>,
}

/// A resolved, validated item query.
///
/// Built once at Find time from a known (content type, taxonomy) pair;
/// `term_ids: None` means no term restriction.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub content_type: String,
    pub taxonomy: String,
    pub term_ids: Option<Vec<u64>>,
}

/// Storage interface for the content catalog and its items.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List deletable content types that have at least one taxonomy,
    /// ordered by label.
    async fn list_types(&self) -> StorageResult<Vec<ContentType>>;

    /// Look up one content type by identifier.
    async fn get_type(&self, id: &str) -> StorageResult<Option<ContentType>>;

    /// Whether a taxonomy exists at all, independent of any content type.
    async fn taxonomy_exists(&self, id: &str) -> StorageResult<bool>;

    /// IDs of all items matching the query, in any status.
    ///
    /// Ordering must be stable and deterministic across repeated calls
    /// against the same data: ascending item ID.
    async fn find_ids(&self, query: &ItemQuery) -> StorageResult<Vec<u64>>;

    /// Display title of an item, if it exists.
    async fn title(&self, id: u64) -> StorageResult<Option<String>>;

    /// Permanently delete an item.
    ///
    /// Returns false when the item does not exist or cannot be removed.
    async fn delete_item(&self, id: u64) -> StorageResult<bool>;
}
