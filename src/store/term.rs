//! Taxonomy term storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::StorageResult;

/// One taxonomy term.
///
/// `count` is the stored attachment count, which may lag behind item
/// deletions until `refresh_counts` recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    pub count: u64,
}

/// Storage interface for taxonomy terms.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// All terms of a taxonomy, including terms with zero items,
    /// ordered by name.
    async fn list_terms(&self, taxonomy: &str) -> StorageResult<Vec<Term>>;

    /// Look up one term within a taxonomy.
    async fn get_term(&self, id: u64, taxonomy: &str) -> StorageResult<Option<Term>>;

    /// Recompute the stored item counts for the given terms from the
    /// items currently present.
    async fn refresh_counts(&self, ids: &[u64], taxonomy: &str) -> StorageResult<()>;

    /// Delete a term. Returns false when it does not exist.
    async fn delete_term(&self, id: u64, taxonomy: &str) -> StorageResult<bool>;
}
