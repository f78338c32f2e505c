//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to a bulksweep server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request did not complete. For a batch dispatch this is the
    /// transport failure the scheduler absorbs as a whole-slice error.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response outside the domain envelopes.
    #[error("api error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Server health check failed.
    #[error("server unhealthy (status {status})")]
    ServerUnhealthy { status: u16 },
}
