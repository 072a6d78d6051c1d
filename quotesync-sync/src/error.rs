//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error (request could not be sent or completed).
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("remote returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The remote answered with a body we cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another sync is fetching, applying, or awaiting resolution.
    #[error("a sync is already in progress")]
    SyncInProgress,

    /// `resolve` was called with no manual sync awaiting a decision.
    #[error("no sync is awaiting resolution")]
    NoPendingResolution,

    /// The auto-sync timer is already running.
    #[error("auto sync is already running")]
    AlreadyRunning,

    /// A quote supplied by the user was rejected.
    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    /// An imported collection failed validation; nothing was imported.
    #[error("malformed import: {0}")]
    MalformedImport(String),

    /// Channel closed.
    #[error("channel closed")]
    ChannelClosed,
}

impl SyncError {
    /// Returns true if this error came from talking to the remote source.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::Status { .. } | SyncError::Protocol(_)
        )
    }
}
