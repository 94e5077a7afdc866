//! Client error types.

use std::fmt;

use slotz_core::SlotError;
use slotz_protocol::{ErrorResponse, ProtocolError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration or seed data error.
    Config(String),
    /// IO error.
    Io(std::io::Error),
    /// Connection to server failed.
    Connection(String),
    /// Protocol/framing error.
    Protocol(String),
    /// Request timed out.
    Timeout(String),
    /// The server answered with an error.
    Server(ErrorResponse),
    /// Bad search parameters.
    InvalidInput(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Connection(msg) => write!(f, "connection error: {}", msg),
            Self::Protocol(msg) => write!(f, "protocol error: {}", msg),
            Self::Timeout(msg) => write!(f, "timeout: {}", msg),
            Self::Server(err) => write!(f, "server error: {}", err.message),
            Self::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Timeout { operation } => Self::Timeout(operation),
            ProtocolError::Io(err) => Self::Io(err),
            other => Self::Protocol(other.to_string()),
        }
    }
}

impl From<SlotError> for ClientError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::InvalidRequest(msg) => Self::InvalidInput(msg),
            SlotError::InvalidMeeting(msg) => Self::Config(format!("invalid meeting: {}", msg)),
            SlotError::Repository(msg) => Self::Config(format!("repository: {}", msg)),
        }
    }
}
