//! Shared error and result types.

use thiserror::Error;

/// Errors surfaced by the sync core.
///
/// Read-side failures (reachability probes, corrupt local documents) never
/// appear here - those paths resolve to "unreachable" or "absent" instead.
/// Mutation failures always propagate so the caller can decide whether to
/// queue, roll back, or display the reason.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level failure: timeout, refused connection, DNS.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered 401 for a mutation. Distinct from network
    /// failure; not retried automatically.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server rejected the request with an error payload.
    #[error("server rejected request (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Local store I/O failure on a write path.
    #[error("local storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON encoding failure when persisting a local document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
