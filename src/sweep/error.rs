//! Sweep workflow error types.

use thiserror::Error;

use crate::store::StorageError;

/// Errors that abort a single Find or DeleteBatch call.
///
/// Per-item and per-term failures are never raised as errors; they are
/// counted in the call's outcome and processing continues.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Unknown content type/taxonomy, or a taxonomy not associated with
    /// the content type. Raised before any state is created or mutated.
    #[error("{0}")]
    InvalidSelection(String),

    /// A batch call with zero IDs: a caller error, not a partial failure.
    #[error("no item IDs provided for this batch")]
    EmptyBatch,

    /// The storage layer failed outright.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
