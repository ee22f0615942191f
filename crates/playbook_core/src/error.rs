//! Play editing error types

use thiserror::Error;

use crate::roster::PlayerId;

/// Errors returned by play editing operations.
///
/// A failed operation never leaves the play partially modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// The player is not in the roster
    #[error("Unknown player: {0:?}")]
    UnknownPlayer(PlayerId),

    /// The keyframe index does not exist
    #[error("Keyframe index {index} out of range (play has {len} keyframes)")]
    KeyframeOutOfRange { index: usize, len: usize },

    /// Deleting the only keyframe is not allowed
    #[error("A play must keep at least one keyframe")]
    LastKeyframe,
}

/// Result type for play editing operations
pub type Result<T> = std::result::Result<T, PlayError>;
