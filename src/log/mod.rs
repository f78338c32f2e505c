//! Structured activity log.
//!
//! Every Find, batch deletion, term cleanup and retention sweep appends one
//! entry here. Entries are immutable once written and only removed by the
//! retention sweep or a manual purge.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use ulid::Ulid;

use crate::operation::OperationSettings;
use crate::store::{LogStore, StorageResult};

// ============================================================================
// Entry Types
// ============================================================================

/// Which workflow step produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Find,
    DeleteBatch,
    TermCleanup,
    CronCleanup,
    CronSchedule,
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Find => "find",
            Self::DeleteBatch => "delete_batch",
            Self::TermCleanup => "term_cleanup",
            Self::CronCleanup => "cron_cleanup",
            Self::CronSchedule => "cron_schedule",
        };
        f.write_str(s)
    }
}

impl FromStr for LogAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "find" => Ok(Self::Find),
            "delete_batch" => Ok(Self::DeleteBatch),
            "term_cleanup" => Ok(Self::TermCleanup),
            "cron_cleanup" => Ok(Self::CronCleanup),
            "cron_schedule" => Ok(Self::CronSchedule),
            other => Err(format!("unknown log action '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for LogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log status '{other}'")),
        }
    }
}

/// One immutable activity log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: LogAction,
    pub status: LogStatus,
    pub acting_user: String,
    pub summary: String,
    /// Snapshot of the operation settings relevant to this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<OperationSettings>,
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

impl LogEntry {
    pub fn new(
        action: LogAction,
        status: LogStatus,
        acting_user: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            timestamp: Utc::now(),
            action,
            status,
            acting_user: acting_user.into(),
            summary: summary.into(),
            criteria: None,
            found: None,
            attempted: None,
            deleted: None,
            errors: None,
            details: Vec::new(),
        }
    }

    pub fn with_criteria(mut self, criteria: OperationSettings) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn with_found(mut self, found: u64) -> Self {
        self.found = Some(found);
        self
    }

    pub fn with_attempted(mut self, attempted: u64) -> Self {
        self.attempted = Some(attempted);
        self
    }

    pub fn with_counts(mut self, deleted: u64, errors: u64) -> Self {
        self.deleted = Some(deleted);
        self.errors = Some(errors);
        self
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Filters for querying the log store.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub action: Option<LogAction>,
    pub status: Option<LogStatus>,
    /// Maximum entries returned, newest first.
    pub limit: Option<usize>,
}

// ============================================================================
// ActivityLog
// ============================================================================

/// Write facade over the log store.
///
/// Recording never fails the calling workflow: when the store rejects a
/// write the entry falls back to the process log and the operation's own
/// outcome is unaffected.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn LogStore>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Append an entry, swallowing store failures.
    pub async fn record(&self, entry: LogEntry) {
        if let Err(e) = self.store.append(&entry).await {
            warn!(
                action = %entry.action,
                summary = %entry.summary,
                error = %e,
                "failed to persist activity log entry"
            );
        }
    }

    pub async fn query(&self, query: &LogQuery) -> StorageResult<Vec<LogEntry>> {
        self.store.query(query).await
    }

    /// Remove entries older than `retention_days`. 0 keeps everything.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_older_than(&self, retention_days: u32) -> StorageResult<usize> {
        if retention_days == 0 {
            return Ok(0);
        }
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(retention_days));
        self.store.purge_older_than(cutoff).await
    }
}
