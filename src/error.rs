//! Error taxonomy for editing, playback and import operations.
//!
//! Every variant is recoverable: the operation that returns it leaves the
//! session untouched, and the caller decides how to present it.

/// Errors reported by the choreography core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoreoError {
    /// Attempted to delete the last remaining keyframe.
    #[error("A choreography needs at least one keyframe")]
    MinimumViolation,

    /// Keyframe index outside the sequence.
    #[error("Keyframe index {index} is out of range (sequence has {len} keyframes)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current sequence length
        len: usize,
    },

    /// Grid address outside the 8×3 display.
    #[error("Clock cell (slave {slave}, clock {clock}) is outside the 8x3 grid")]
    CellOutOfRange {
        /// Requested slave (column)
        slave: usize,
        /// Requested clock (row)
        clock: usize,
    },

    /// Loop start would come after loop end.
    #[error("Loop start {start} must not come after loop end {end}")]
    InvalidRange {
        /// Loop start that was set or requested
        start: usize,
        /// Loop end that was set or requested
        end: usize,
    },

    /// Malformed snapshot.
    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    /// Playback needs at least two keyframes.
    #[error("Playback needs at least 2 keyframes (have {count})")]
    InsufficientKeyframes {
        /// Number of keyframes available
        count: usize,
    },
}

/// Result alias for core operations.
pub type ChoreoResult<T> = std::result::Result<T, ChoreoError>;
