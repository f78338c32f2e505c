//! JSONL-backed activity log store.
//!
//! One entry per line in `entries.jsonl`. Appends go straight to the end
//! of the file; the retention purge rewrites the file atomically.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::log::{LogEntry, LogQuery};
use crate::store::{LogStore, StorageError, StorageResult};

const LOG_FILE: &str = "entries.jsonl";

/// Default number of entries returned by an unbounded query.
const DEFAULT_QUERY_LIMIT: usize = 100;

pub struct FileLogStore {
    path: PathBuf,
    /// Serializes file access across append/query/purge.
    lock: Mutex<()>,
}

impl FileLogStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(LOG_FILE),
            lock: Mutex::new(()),
        }
    }

    async fn read_entries(&self) -> StorageResult<Vec<LogEntry>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::file_io(&self.path, e)),
        };

        let mut entries = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "skipping malformed log line");
                }
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn append(&self, entry: &LogEntry) -> StorageResult<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::file_io(parent, e))?;
        }

        let mut line = serde_json::to_string(entry)
            .map_err(|e| StorageError::serialization(e.to_string()))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;
        Ok(())
    }

    async fn query(&self, query: &LogQuery) -> StorageResult<Vec<LogEntry>> {
        let _guard = self.lock.lock().await;

        let mut entries = self.read_entries().await?;
        entries.retain(|entry| {
            query.action.is_none_or(|a| entry.action == a)
                && query.status.is_none_or(|s| entry.status == s)
        });
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(query.limit.unwrap_or(DEFAULT_QUERY_LIMIT));
        Ok(entries)
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        let _guard = self.lock.lock().await;

        let entries = self.read_entries().await?;
        let total = entries.len();
        let kept: Vec<&LogEntry> = entries.iter().filter(|e| e.timestamp > cutoff).collect();
        let removed = total - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let mut contents = String::new();
        for entry in &kept {
            contents.push_str(
                &serde_json::to_string(entry)
                    .map_err(|e| StorageError::serialization(e.to_string()))?,
            );
            contents.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(|e| StorageError::file_io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;
        Ok(removed)
    }
}

// ============================================================================
// Tests
// ============================================================================
