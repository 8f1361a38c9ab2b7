//! Error types for trajectory construction.

use thiserror::Error;

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, TrajectoryError>;

/// Errors raised while resolving frames and objects.
///
/// Numeric problems (NaN, infinities) are never reported here: they flow
/// through the arithmetic untouched. Use [`crate::validation`] upstream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    /// Requested frame lies past the end of the supplied frame storage
    #[error("Frame {frame} out of range (storage holds frames below {available})")]
    FrameOutOfRange { frame: usize, available: usize },

    /// Frame index is inside the storage range but has no entry (map storage gap)
    #[error("Frame {frame} has no entry")]
    FrameMissing { frame: usize },

    /// Tracked object absent from a frame inside its lifetime
    #[error("Object {id} not found in frame {frame}")]
    ObjectNotFound { id: String, frame: usize },

    /// Input rejected by the validators
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TrajectoryError {
    /// Creates an object-not-found error.
    pub fn object_not_found(id: impl std::fmt::Display, frame: usize) -> Self {
        Self::ObjectNotFound {
            id: id.to_string(),
            frame,
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
