//! Keyed store for in-flight operation state.
//!
//! State is keyed by acting user, so concurrent operators do not interfere.
//! A later Find by the same user overwrites the previous entry (last Find
//! wins). Entries expire after a TTL so an abandoned operation does not
//! linger.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{OperationSettings, OperationState};

struct StoredOperation {
    state: OperationState,
    created_at: DateTime<Utc>,
}

/// In-memory registry of per-user operation state with TTL expiry.
#[derive(Clone)]
pub struct OperationRegistry {
    entries: Arc<DashMap<String, StoredOperation>>,
    ttl: chrono::Duration,
}

impl OperationRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1)),
        }
    }

    /// Store a fresh operation for `actor`, replacing any previous one.
    pub fn put(&self, actor: &str, settings: OperationSettings, target_ids: Vec<u64>) {
        self.prune_expired();
        self.entries.insert(
            actor.to_string(),
            StoredOperation {
                state: OperationState {
                    settings,
                    target_ids,
                },
                created_at: Utc::now(),
            },
        );
    }

    /// Current settings for `actor`, if the operation is still alive.
    pub fn settings_for(&self, actor: &str) -> Option<OperationSettings> {
        if self.is_expired(actor) {
            self.entries.remove(actor);
            return None;
        }
        self.entries
            .get(actor)
            .map(|stored| stored.state.settings.clone())
    }

    /// Remove and return `actor`'s operation state.
    ///
    /// Called on last-batch completion: the state must be gone afterwards
    /// regardless of what the caller does with it.
    pub fn take(&self, actor: &str) -> Option<OperationState> {
        let (_, stored) = self.entries.remove(actor)?;
        if Utc::now() - stored.created_at > self.ttl {
            return None;
        }
        Some(stored.state)
    }

    /// Drop `actor`'s operation state, if any.
    pub fn clear(&self, actor: &str) {
        self.entries.remove(actor);
    }

    fn is_expired(&self, actor: &str) -> bool {
        match self.entries.get(actor) {
            Some(stored) => Utc::now() - stored.created_at > self.ttl,
            None => false,
        }
    }

    fn prune_expired(&self) {
        let now = Utc::now();
        self.entries
            .retain(|_, stored| now - stored.created_at <= self.ttl);
    }
}
