//! Error types shared across the workspace.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by durable key-value backends.
///
/// Reads treat these as non-fatal (degrade to absent); writes propagate them
/// to the immediate caller, who owns retry policy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage I/O failed.
    #[error("storage I/O failure: {0}")]
    Io(String),

    /// A stored value no longer decodes.
    #[error("corrupt value under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Failures raised by the remote store adapter.
///
/// Never fatal to a drain pass; the queue processor records them as per-item
/// retry increments.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// The backing store rejected the call.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The call never completed (network failure, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The payload cannot be represented on the wire.
    #[error("invalid payload: {0}")]
    Payload(String),
}

impl RemoteStoreError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload(message.into())
    }
}

/// Top-level error for the sync subsystem.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteStoreError),

    /// Caller supplied an unusable filter (inverted range, negative bound).
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
