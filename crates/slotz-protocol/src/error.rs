//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while framing, encoding or exchanging messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A frame announced or produced more than `MAX_MESSAGE_SIZE` bytes.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: u32, max: u32 },

    /// The payload was not valid JSON for the expected type.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The peer speaks another protocol version.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer ended before the announced frame did.
    #[error("incomplete message: expected {expected} bytes, got {received}")]
    IncompleteMessage { expected: usize, received: usize },

    /// A frame announced a zero-length payload.
    #[error("empty message")]
    EmptyMessage,

    #[error("timeout during {operation}")]
    Timeout { operation: String },
}

impl ProtocolError {
    /// Creates a timeout error for the named operation.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }
}
