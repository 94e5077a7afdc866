//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type SlotResult<T> = Result<T, SlotError>;

/// Errors that can occur while building inputs or searching for slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// A search request violated its preconditions.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A meeting violated its invariants.
    #[error("invalid meeting: {0}")]
    InvalidMeeting(String),

    /// The attendee/meeting repository could not answer.
    #[error("repository error: {0}")]
    Repository(String),
}

impl SlotError {
    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates an invalid meeting error.
    pub fn invalid_meeting(message: impl Into<String>) -> Self {
        Self::InvalidMeeting(message.into())
    }

    /// Creates a repository error.
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository(message.into())
    }

    /// Returns true if the caller sent bad input (as opposed to a backend failure).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::InvalidMeeting(_))
    }
}
