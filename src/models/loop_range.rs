//! Loop markers over the keyframe sequence.
//!
//! The range stores raw keyframe indices. It is never rewritten when the
//! sequence is edited, so a loop over 2..4 refers to whatever keyframes sit
//! at those positions after an insert, delete or move.

use crate::constants::DEFAULT_LOOP_COUNT;
use crate::error::{ChoreoError, ChoreoResult};
use serde::Serialize;
use std::fmt;

/// Optional loop start/end markers plus a repeat count.
///
/// # Validation
///
/// - when both markers are set, `start <= end`
/// - `count == 0` means repeat forever
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopRange {
    start: Option<usize>,
    end: Option<usize>,
    count: u32,
}

impl LoopRange {
    /// Creates an empty range with the default repeat count.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: None,
            end: None,
            count: DEFAULT_LOOP_COUNT,
        }
    }

    /// Builds a range from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::InvalidRange`] if both markers are set and `start > end`.
    pub fn from_parts(start: Option<usize>, end: Option<usize>, count: u32) -> ChoreoResult<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ChoreoError::InvalidRange { start, end });
            }
        }
        Ok(Self { start, end, count })
    }

    /// Loop start marker.
    #[must_use]
    pub const fn start(&self) -> Option<usize> {
        self.start
    }

    /// Loop end marker.
    #[must_use]
    pub const fn end(&self) -> Option<usize> {
        self.end
    }

    /// Number of passes through the loop body (0 = infinite).
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Whether the loop repeats forever.
    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        self.count == 0
    }

    /// Both markers when the range is fully defined.
    #[must_use]
    pub fn bounds(&self) -> Option<(usize, usize)> {
        self.start.zip(self.end)
    }

    /// Sets the loop start.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::InvalidRange`] if an end is set and `index > end`.
    pub fn set_start(&mut self, index: usize) -> ChoreoResult<()> {
        if let Some(end) = self.end {
            if index > end {
                return Err(ChoreoError::InvalidRange { start: index, end });
            }
        }
        self.start = Some(index);
        Ok(())
    }

    /// Sets the loop end.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::InvalidRange`] if a start is set and `index < start`.
    pub fn set_end(&mut self, index: usize) -> ChoreoResult<()> {
        if let Some(start) = self.start {
            if index < start {
                return Err(ChoreoError::InvalidRange { start, end: index });
            }
        }
        self.end = Some(index);
        Ok(())
    }

    /// Removes only the start marker.
    pub fn clear_start(&mut self) {
        self.start = None;
    }

    /// Removes only the end marker.
    pub fn clear_end(&mut self) {
        self.end = None;
    }

    /// Removes both markers; the repeat count is kept.
    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Sets the repeat count (0 = infinite).
    pub fn set_count(&mut self, count: u32) {
        self.count = count;
    }

    /// Whether `index` lies inside a fully defined loop.
    #[must_use]
    pub fn is_index_in_loop(&self, index: usize) -> bool {
        self.bounds()
            .is_some_and(|(start, end)| (start..=end).contains(&index))
    }
}

impl Default for LoopRange {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoopRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repeats = if self.is_infinite() {
            "∞".to_string()
        } else {
            format!("{}x", self.count)
        };
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                write!(f, "Loop: KF {} → KF {} ({repeats})", start + 1, end + 1)
            }
            (Some(start), None) => write!(f, "Start: KF {} (no end)", start + 1),
            (None, Some(end)) => write!(f, "End: KF {} (no start)", end + 1),
            (None, None) => write!(f, "No loop"),
        }
    }
}
