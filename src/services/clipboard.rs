//! Clipboard for copying clock faces between cells and keyframes.
//!
//! Copies keep the source address of every cell so a paste with no
//! selection puts each face back where it came from.

use tracing::debug;

use crate::models::{CellAddress, ClockTarget, Keyframe, Selection};

/// Clipboard state for clock-face copy/paste.
#[derive(Debug, Clone, Default)]
pub struct ClockClipboard {
    /// Copied faces in (slave, clock) order
    content: Vec<(CellAddress, ClockTarget)>,
}

impl ClockClipboard {
    /// Create a new empty clipboard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: Vec::new(),
        }
    }

    /// Copies the selected faces of `keyframe`.
    ///
    /// Returns how many faces were copied. An empty selection copies
    /// nothing and leaves the previous content in place.
    pub fn copy(&mut self, selection: &Selection, keyframe: &Keyframe) -> usize {
        if selection.is_empty() {
            return 0;
        }
        self.content = selection
            .iter()
            .map(|cell| (cell, *keyframe.clock(cell)))
            .collect();
        debug!(count = self.content.len(), "Copied clock faces");
        self.content.len()
    }

    /// Writes the copied faces into `keyframe`.
    ///
    /// With a selection, the first copied face goes to every selected cell.
    /// Without one, each copied face returns to its own address.
    /// Returns how many cells were written.
    pub fn paste(&self, selection: &Selection, keyframe: &mut Keyframe) -> usize {
        let Some(&(_, first)) = self.content.first() else {
            return 0;
        };

        let written = if selection.is_empty() {
            for &(cell, target) in &self.content {
                *keyframe.clock_mut(cell) = target;
            }
            self.content.len()
        } else {
            for cell in selection.iter() {
                *keyframe.clock_mut(cell) = first;
            }
            selection.len()
        };
        debug!(count = written, "Pasted clock faces");
        written
    }

    /// Check if there is content to paste.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Number of copied faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the clipboard holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Clear the entire clipboard.
    pub fn clear(&mut self) {
        self.content.clear();
    }
}
