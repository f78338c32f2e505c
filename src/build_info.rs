//! Build metadata exposed by the CLI and the /version endpoint.

/// Crate version as recorded by Cargo at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
