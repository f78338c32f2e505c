//! Server-side sweep workflow: find, per-batch execution, term cleanup.

mod error;
mod executor;
mod finder;
mod term_cleanup;

pub use error::SweepError;
pub use executor::{BatchOutcome, process_batch};
pub use finder::{FindCriteria, FindOutcome, FoundItem, QueryFilter, find_items};
pub use term_cleanup::{CleanupOutcome, cleanup_empty_terms};
