//! Notification error types.

use thiserror::Error;

/// Notification dispatch errors. Never surfaced to API callers; logged by
/// the dispatching operation.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport-level failure
    #[error("Push request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway answered with a non-success status
    #[error("Push gateway rejected request with status {0}")]
    Rejected(u16),
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;
