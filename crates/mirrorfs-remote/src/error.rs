//! Structured remote API error.

use thiserror::Error;

use mirrorfs_core::error::{AppError, ErrorKind};

use crate::retry;

/// Well-known error codes returned by the remote store API.
pub mod codes {
    /// The object addressed by key does not exist.
    pub const OBJECT_NOT_FOUND: &str = "object_not_found";
    /// An upload intent was requested for a key that already exists.
    pub const KEY_EXISTS: &str = "key_exists";
    /// The request never produced an HTTP response.
    pub const TRANSPORT: &str = "transport";
    /// The response body carried no parsable error code.
    pub const UNKNOWN: &str = "unknown";
}

/// A failed exchange with the remote store API, surfaced after retry
/// exhaustion (or immediately for terminal statuses).
#[derive(Debug, Clone, Error)]
#[error("remote store request failed (status {status}, code {code}): {message}")]
pub struct RemoteApiError {
    /// HTTP status of the final response; 0 when no response was received.
    pub status: u16,
    /// Remote error code parsed from the response body.
    pub code: String,
    /// Remote error message, or a transport description.
    pub message: String,
    /// Correlation id from the `x-request-id` response header.
    pub correlation_id: Option<String>,
    /// Parsed `Retry-After` seconds, when the response carried one.
    pub retry_after_seconds: Option<u64>,
}

impl RemoteApiError {
    /// Whether the remote reported the addressed object missing.
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code == codes::OBJECT_NOT_FOUND
    }

    /// Whether the remote refused an upload intent for an existing key.
    pub fn is_duplicate_key(&self) -> bool {
        self.code == codes::KEY_EXISTS
    }
}

impl From<RemoteApiError> for AppError {
    fn from(err: RemoteApiError) -> Self {
        let kind = if err.status == 429 {
            ErrorKind::RateLimit
        } else if err.status == 0 || retry::is_retryable_status(err.status) {
            ErrorKind::ServiceUnavailable
        } else {
            ErrorKind::RemoteStore
        };
        let correlation = err.correlation_id.as_deref().unwrap_or("-");
        AppError::with_source(
            kind,
            format!(
                "Remote store request failed: status {}, code {}, correlation id {}",
                err.status, err.code, correlation
            ),
            err,
        )
    }
}
