//! Storage interfaces and backends.
//!
//! The service talks to content, terms and the activity log only through
//! the traits defined here; `file` holds the JSON-backed implementations.

mod content;
mod error;
pub mod file;
mod log;
mod term;

pub use content::{ContentStore, ContentType, ItemQuery, TaxonomyRef};
pub use error::{StorageError, StorageResult};
pub use log::LogStore;
pub use term::{Term, TermStore};
