//! Selection of clock faces used to scope bulk edits.
//!
//! Selection never affects playback and is never persisted.

use crate::constants::{CLOCKS_PER_SLAVE, SLAVE_COUNT};
use crate::error::{ChoreoError, ChoreoResult};
use crate::models::clock::CellAddress;
use std::collections::BTreeSet;

/// Set of addressed grid cells, kept in (slave, clock) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cells: BTreeSet<CellAddress>,
}

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of selected cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether `cell` is selected.
    #[must_use]
    pub fn contains(&self, cell: CellAddress) -> bool {
        self.cells.contains(&cell)
    }

    /// Selected cells in (slave, clock) order.
    pub fn iter(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.cells.iter().copied()
    }

    /// Cells a bulk edit should touch: the selection, or the whole grid when empty.
    #[must_use]
    pub fn targets(&self) -> Vec<CellAddress> {
        if self.cells.is_empty() {
            CellAddress::all().collect()
        } else {
            self.iter().collect()
        }
    }

    /// Toggles `cell`. Without `additive`, everything else is deselected first.
    pub fn toggle(&mut self, cell: CellAddress, additive: bool) {
        if !additive {
            let was_selected = self.cells.contains(&cell);
            self.cells.clear();
            if !was_selected {
                self.cells.insert(cell);
            }
            return;
        }

        if !self.cells.remove(&cell) {
            self.cells.insert(cell);
        }
    }

    /// Adds `cell` without touching the rest.
    pub fn insert(&mut self, cell: CellAddress) {
        self.cells.insert(cell);
    }

    /// Replaces the selection with `cells`.
    pub fn replace(&mut self, cells: impl IntoIterator<Item = CellAddress>) {
        self.cells = cells.into_iter().collect();
    }

    /// Selects the whole grid.
    pub fn select_all(&mut self) {
        self.replace(CellAddress::all());
    }

    /// Deselects everything.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Replaces the selection with one slave column.
    pub fn select_column(&mut self, slave: usize) -> ChoreoResult<()> {
        if slave >= SLAVE_COUNT {
            return Err(ChoreoError::CellOutOfRange { slave, clock: 0 });
        }
        self.replace(CellAddress::all().filter(|cell| cell.slave() == slave));
        Ok(())
    }

    /// Replaces the selection with one clock row.
    pub fn select_row(&mut self, clock: usize) -> ChoreoResult<()> {
        if clock >= CLOCKS_PER_SLAVE {
            return Err(ChoreoError::CellOutOfRange { slave: 0, clock });
        }
        self.replace(CellAddress::all().filter(|cell| cell.clock() == clock));
        Ok(())
    }
}
