//! Activity log storage trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::log::{LogEntry, LogQuery};

use super::error::StorageResult;

/// Storage interface for activity log entries.
///
/// Entries are append-only; removal happens only through the retention
/// purge.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one entry. Entries must be persisted durably before returning.
    async fn append(&self, entry: &LogEntry) -> StorageResult<()>;

    /// Entries matching the filters, newest first.
    async fn query(&self, query: &LogQuery) -> StorageResult<Vec<LogEntry>>;

    /// Permanently remove every entry dated at or before `cutoff`.
    ///
    /// Returns the number of entries removed.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> StorageResult<usize>;
}
