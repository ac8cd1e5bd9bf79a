//! Ordered keyframe sequence with a current-keyframe cursor.
//!
//! Sequence order is playback order. Cell edits always act on the current
//! keyframe; bulk edits take an explicit target list so callers can apply
//! the "selection, or else the whole grid" policy.

use tracing::debug;

use crate::error::{ChoreoError, ChoreoResult};
use crate::models::{CellAddress, ClockTarget, Direction, Hand, Keyframe};

/// Outcome of a one-step reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Reorder {
    /// Keyframe moved; it now sits at `to`.
    Moved {
        /// New position of the moved keyframe
        to: usize,
    },
    /// Keyframe already at that end of the sequence; nothing changed.
    AtBoundary,
}

/// Ordered keyframes plus the index of the keyframe being edited.
///
/// # Invariants
///
/// - at least one keyframe
/// - `current < keyframes.len()`
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeStore {
    keyframes: Vec<Keyframe>,
    current: usize,
}

impl KeyframeStore {
    /// Creates a store holding a single default keyframe.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyframes: vec![Keyframe::new()],
            current: 0,
        }
    }

    /// Wraps existing keyframes, selecting the first one.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::MinimumViolation`] when `keyframes` is empty.
    pub fn from_keyframes(keyframes: Vec<Keyframe>) -> ChoreoResult<Self> {
        if keyframes.is_empty() {
            return Err(ChoreoError::MinimumViolation);
        }
        Ok(Self {
            keyframes,
            current: 0,
        })
    }

    /// Number of keyframes (always ≥ 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// All keyframes in playback order.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Keyframe at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Index of the keyframe being edited.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The keyframe being edited.
    #[must_use]
    pub fn current(&self) -> &Keyframe {
        &self.keyframes[self.current]
    }

    /// Mutable access to the keyframe being edited.
    pub fn current_mut(&mut self) -> &mut Keyframe {
        &mut self.keyframes[self.current]
    }

    fn check_index(&self, index: usize) -> ChoreoResult<()> {
        if index >= self.keyframes.len() {
            return Err(ChoreoError::IndexOutOfRange {
                index,
                len: self.keyframes.len(),
            });
        }
        Ok(())
    }

    /// Makes `index` the current keyframe.
    pub fn select(&mut self, index: usize) -> ChoreoResult<()> {
        self.check_index(index)?;
        self.current = index;
        Ok(())
    }

    /// Steps to the previous keyframe; returns false at the start.
    pub fn select_previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Steps to the next keyframe; returns false at the end.
    pub fn select_next(&mut self) -> bool {
        if self.current + 1 >= self.keyframes.len() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Appends a default keyframe at the end and selects it.
    pub fn append(&mut self) -> usize {
        self.keyframes.push(Keyframe::new());
        self.current = self.keyframes.len() - 1;
        debug!(index = self.current, "Appended keyframe");
        self.current
    }

    /// Inserts a default keyframe right after the current one and selects it.
    pub fn insert_after_current(&mut self) -> usize {
        let index = self.current + 1;
        self.keyframes.insert(index, Keyframe::new());
        self.current = index;
        debug!(index, "Inserted keyframe");
        index
    }

    /// Inserts a deep copy of the current keyframe after it and selects the copy.
    pub fn duplicate_current(&mut self) -> usize {
        let copy = self.current().duplicate();
        let index = self.current + 1;
        self.keyframes.insert(index, copy);
        self.current = index;
        debug!(index, "Duplicated keyframe");
        index
    }

    /// Removes the current keyframe, clamping the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::MinimumViolation`] when only one keyframe is left.
    pub fn delete_current(&mut self) -> ChoreoResult<Keyframe> {
        if self.keyframes.len() <= 1 {
            return Err(ChoreoError::MinimumViolation);
        }
        let removed = self.keyframes.remove(self.current);
        if self.current >= self.keyframes.len() {
            self.current = self.keyframes.len() - 1;
        }
        debug!(id = %removed.id, remaining = self.keyframes.len(), "Deleted keyframe");
        Ok(removed)
    }

    /// Moves the keyframe at `from` next to the one at `to`.
    ///
    /// With `insert_before` it lands in front of `to`, otherwise behind it.
    /// The cursor follows the keyframe it pointed at, not the slot.
    /// Returns the moved keyframe's new index.
    pub fn move_to(&mut self, from: usize, to: usize, insert_before: bool) -> ChoreoResult<usize> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(from);
        }

        let moved = self.keyframes.remove(from);
        let new_index = match (from < to, insert_before) {
            (true, true) => to - 1,
            (true, false) => to,
            (false, true) => to,
            (false, false) => to + 1,
        };
        self.keyframes.insert(new_index, moved);

        if self.current == from {
            self.current = new_index;
        } else if from < self.current && new_index >= self.current {
            self.current -= 1;
        } else if from > self.current && new_index <= self.current {
            self.current += 1;
        }

        debug!(from, to = new_index, "Moved keyframe");
        Ok(new_index)
    }

    /// Swaps the current keyframe with the one before it.
    pub fn swap_with_previous(&mut self) -> Reorder {
        if self.current == 0 {
            return Reorder::AtBoundary;
        }
        self.keyframes.swap(self.current - 1, self.current);
        self.current -= 1;
        Reorder::Moved { to: self.current }
    }

    /// Swaps the current keyframe with the one after it.
    pub fn swap_with_next(&mut self) -> Reorder {
        if self.current + 1 >= self.keyframes.len() {
            return Reorder::AtBoundary;
        }
        self.keyframes.swap(self.current, self.current + 1);
        self.current += 1;
        Reorder::Moved { to: self.current }
    }

    /// Sets one hand angle on the current keyframe.
    pub fn set_angle(&mut self, cell: CellAddress, hand: Hand, angle: f64) {
        self.current_mut().clock_mut(cell).set_angle(hand, angle);
    }

    /// Sets one hand direction on the current keyframe.
    pub fn set_direction(&mut self, cell: CellAddress, hand: Hand, direction: Direction) {
        self.current_mut()
            .clock_mut(cell)
            .set_direction(hand, direction);
    }

    /// Sets both hand angles on every target cell.
    pub fn set_all_angles(&mut self, targets: &[CellAddress], angle_h: f64, angle_m: f64) {
        let keyframe = self.current_mut();
        for &cell in targets {
            let clock = keyframe.clock_mut(cell);
            clock.set_angle(Hand::Hour, angle_h);
            clock.set_angle(Hand::Minute, angle_m);
        }
    }

    /// Sets both hand directions on every target cell.
    pub fn set_all_directions(&mut self, targets: &[CellAddress], dir_h: Direction, dir_m: Direction) {
        let keyframe = self.current_mut();
        for &cell in targets {
            let clock = keyframe.clock_mut(cell);
            clock.dir_h = dir_h;
            clock.dir_m = dir_m;
        }
    }

    /// Left/right mirror of every target cell.
    pub fn apply_vertical_symmetry(&mut self, targets: &[CellAddress]) {
        let keyframe = self.current_mut();
        for &cell in targets {
            keyframe.clock_mut(cell).mirror_vertical();
        }
    }

    /// Top/bottom mirror of every target cell.
    pub fn apply_horizontal_symmetry(&mut self, targets: &[CellAddress]) {
        let keyframe = self.current_mut();
        for &cell in targets {
            keyframe.clock_mut(cell).mirror_horizontal();
        }
    }

    /// Puts every target cell back into the calibration pose.
    pub fn reset_cells(&mut self, targets: &[CellAddress]) {
        let keyframe = self.current_mut();
        for &cell in targets {
            *keyframe.clock_mut(cell) = ClockTarget::calibration();
        }
    }
}

impl Default for KeyframeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(slave: usize, clock: usize) -> CellAddress {
        CellAddress::new(slave, clock).unwrap()
    }

    /// Store with `n` keyframes commented "0", "1", … and the cursor on 0.
    fn store_of(n: usize) -> KeyframeStore {
        let keyframes = (0..n)
            .map(|i| {
                let mut kf = Keyframe::new();
                kf.set_comment(i.to_string());
                kf
            })
            .collect();
        KeyframeStore::from_keyframes(keyframes).unwrap()
    }

    fn comments(store: &KeyframeStore) -> Vec<&str> {
        store.keyframes().iter().map(|k| k.comment.as_str()).collect()
    }

    #[test]
    fn test_new_store_has_one_keyframe() {
        let store = KeyframeStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn test_from_empty_fails() {
        assert_eq!(
            KeyframeStore::from_keyframes(Vec::new()),
            Err(ChoreoError::MinimumViolation)
        );
    }

    #[test]
    fn test_delete_down_to_one() {
        let mut store = store_of(3);
        store.delete_current().unwrap();
        store.delete_current().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.delete_current(), Err(ChoreoError::MinimumViolation));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_last_clamps_cursor() {
        let mut store = store_of(3);
        store.select(2).unwrap();
        store.delete_current().unwrap();
        assert_eq!(store.current_index(), 1);
        assert_eq!(comments(&store), vec!["0", "1"]);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut store = store_of(2);
        assert_eq!(
            store.select(2),
            Err(ChoreoError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn test_select_previous_next() {
        let mut store = store_of(2);
        assert!(!store.select_previous());
        assert!(store.select_next());
        assert!(!store.select_next());
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn test_insert_and_append_select_new_keyframe() {
        let mut store = store_of(3);
        store.select(1).unwrap();
        assert_eq!(store.insert_after_current(), 2);
        assert_eq!(store.len(), 4);
        assert_eq!(store.current().comment, "");
        assert_eq!(store.keyframes()[3].comment, "2");

        assert_eq!(store.append(), 4);
        assert_eq!(store.current_index(), 4);
    }

    #[test]
    fn test_duplicate_current() {
        let mut store = store_of(2);
        store.set_angle(at(1, 1), Hand::Hour, 30.0);
        let index = store.duplicate_current();

        assert_eq!(index, 1);
        assert_eq!(comments(&store), vec!["0", "0 (copy)", "1"]);
        assert_ne!(store.keyframes()[0].id, store.keyframes()[1].id);
        assert!((store.current().clock(at(1, 1)).angle_h - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_forward_insert_before() {
        let mut store = store_of(5);
        let new_index = store.move_to(0, 3, true).unwrap();
        assert_eq!(new_index, 2);
        assert_eq!(comments(&store), vec!["1", "2", "0", "3", "4"]);
        // Cursor followed the moved keyframe
        assert_eq!(store.current_index(), 2);
    }

    #[test]
    fn test_move_forward_insert_after() {
        let mut store = store_of(5);
        assert_eq!(store.move_to(1, 3, false).unwrap(), 3);
        assert_eq!(comments(&store), vec!["0", "2", "3", "1", "4"]);
    }

    #[test]
    fn test_move_backward() {
        let mut store = store_of(5);
        assert_eq!(store.move_to(4, 1, true).unwrap(), 1);
        assert_eq!(comments(&store), vec!["0", "4", "1", "2", "3"]);

        let mut store = store_of(5);
        assert_eq!(store.move_to(4, 1, false).unwrap(), 2);
        assert_eq!(comments(&store), vec!["0", "1", "4", "2", "3"]);
    }

    #[test]
    fn test_move_keeps_cursor_on_same_keyframe() {
        // Moving another keyframe from before the cursor to after it
        let mut store = store_of(5);
        store.select(2).unwrap();
        store.move_to(0, 4, false).unwrap();
        assert_eq!(store.current().comment, "2");
        assert_eq!(store.current_index(), 1);

        // Moving another keyframe from after the cursor to before it
        let mut store = store_of(5);
        store.select(2).unwrap();
        store.move_to(4, 0, true).unwrap();
        assert_eq!(store.current().comment, "2");
        assert_eq!(store.current_index(), 3);

        // Moving a keyframe that never crosses the cursor
        let mut store = store_of(5);
        store.select(0).unwrap();
        store.move_to(3, 4, false).unwrap();
        assert_eq!(store.current().comment, "0");
    }

    #[test]
    fn test_move_invalid_and_noop() {
        let mut store = store_of(3);
        assert!(store.move_to(3, 0, true).is_err());
        assert!(store.move_to(0, 5, true).is_err());
        assert_eq!(store.move_to(1, 1, true).unwrap(), 1);
        assert_eq!(comments(&store), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_swaps_report_boundaries() {
        let mut store = store_of(3);
        assert_eq!(store.swap_with_previous(), Reorder::AtBoundary);
        assert_eq!(store.swap_with_next(), Reorder::Moved { to: 1 });
        assert_eq!(comments(&store), vec!["1", "0", "2"]);
        assert_eq!(store.swap_with_next(), Reorder::Moved { to: 2 });
        assert_eq!(store.swap_with_next(), Reorder::AtBoundary);
        assert_eq!(store.swap_with_previous(), Reorder::Moved { to: 1 });
        assert_eq!(comments(&store), vec!["1", "0", "2"]);
    }

    #[test]
    fn test_bulk_edits_only_touch_targets() {
        let mut store = store_of(2);
        let targets = [at(0, 0), at(7, 2)];
        store.set_all_angles(&targets, 90.0, 270.0);
        store.set_all_directions(&targets, Direction::Ccw, Direction::Cw);

        let kf = store.current();
        assert!((kf.clock(at(0, 0)).angle_h - 90.0).abs() < 1e-9);
        assert!((kf.clock(at(7, 2)).angle_m - 270.0).abs() < 1e-9);
        assert_eq!(kf.clock(at(7, 2)).dir_h, Direction::Ccw);
        assert_eq!(*kf.clock(at(3, 1)), ClockTarget::calibration());
        // Other keyframes untouched
        assert_eq!(*store.keyframes()[1].clock(at(0, 0)), ClockTarget::calibration());
    }

    #[test]
    fn test_symmetry_and_reset() {
        let mut store = store_of(1);
        let targets: Vec<_> = CellAddress::all().collect();
        store.set_all_angles(&targets, 90.0, 0.0);

        store.apply_vertical_symmetry(&targets);
        let clock = *store.current().clock(at(4, 1));
        assert!((clock.angle_h - 270.0).abs() < 1e-9);
        assert!(clock.angle_m.abs() < 1e-9);
        assert_eq!(clock.dir_h, Direction::Ccw);

        store.apply_horizontal_symmetry(&targets);
        let clock = *store.current().clock(at(4, 1));
        assert!((clock.angle_h - 270.0).abs() < 1e-9);
        assert!((clock.angle_m - 180.0).abs() < 1e-9);
        assert_eq!(clock.dir_h, Direction::Cw);

        store.reset_cells(&[at(4, 1)]);
        assert_eq!(*store.current().clock(at(4, 1)), ClockTarget::calibration());
    }
}
