//! Clock face targets and grid addressing.

use crate::constants::{CALIBRATION_ANGLE, CLOCKS_PER_SLAVE, SLAVE_COUNT};
use crate::error::{ChoreoError, ChoreoResult};
use crate::models::angle::{self, Direction, Hand};
use serde::Serialize;
use std::fmt;

/// Address of one clock face: slave (column 0-7) and clock (row 0-2).
///
/// Only constructible inside the grid, so indexing a [`ClockGrid`] with it
/// never goes out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    slave: usize,
    clock: usize,
}

impl CellAddress {
    /// Creates a validated cell address.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::CellOutOfRange`] outside the 8×3 grid.
    pub fn new(slave: usize, clock: usize) -> ChoreoResult<Self> {
        if slave >= SLAVE_COUNT || clock >= CLOCKS_PER_SLAVE {
            return Err(ChoreoError::CellOutOfRange { slave, clock });
        }
        Ok(Self { slave, clock })
    }

    /// Slave (column) index.
    #[must_use]
    pub const fn slave(self) -> usize {
        self.slave
    }

    /// Clock (row) index.
    #[must_use]
    pub const fn clock(self) -> usize {
        self.clock
    }

    /// Every cell of the grid, column by column.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SLAVE_COUNT)
            .flat_map(|slave| (0..CLOCKS_PER_SLAVE).map(move |clock| Self { slave, clock }))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}-C{}", self.slave + 1, self.clock)
    }
}

/// Commanded hand angles for one clock face plus the directions used when
/// leaving this state toward the next keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockTarget {
    /// Hour hand angle in degrees, [0, 360)
    pub angle_h: f64,
    /// Minute hand angle in degrees, [0, 360)
    pub angle_m: f64,
    /// Hour hand rotation direction toward the next keyframe
    pub dir_h: Direction,
    /// Minute hand rotation direction toward the next keyframe
    pub dir_m: Direction,
}

impl ClockTarget {
    /// Creates a target, normalizing both angles.
    #[must_use]
    pub fn new(angle_h: f64, angle_m: f64, dir_h: Direction, dir_m: Direction) -> Self {
        Self {
            angle_h: angle::normalize(angle_h),
            angle_m: angle::normalize(angle_m),
            dir_h,
            dir_m,
        }
    }

    /// The 6 o'clock calibration pose, both hands clockwise.
    #[must_use]
    pub const fn calibration() -> Self {
        Self {
            angle_h: CALIBRATION_ANGLE,
            angle_m: CALIBRATION_ANGLE,
            dir_h: Direction::Cw,
            dir_m: Direction::Cw,
        }
    }

    /// Angle of the given hand.
    #[must_use]
    pub const fn angle(&self, hand: Hand) -> f64 {
        match hand {
            Hand::Hour => self.angle_h,
            Hand::Minute => self.angle_m,
        }
    }

    /// Sets the angle of the given hand (normalized).
    pub fn set_angle(&mut self, hand: Hand, angle: f64) {
        let angle = angle::normalize(angle);
        match hand {
            Hand::Hour => self.angle_h = angle,
            Hand::Minute => self.angle_m = angle,
        }
    }

    /// Direction of the given hand.
    #[must_use]
    pub const fn direction(&self, hand: Hand) -> Direction {
        match hand {
            Hand::Hour => self.dir_h,
            Hand::Minute => self.dir_m,
        }
    }

    /// Sets the direction of the given hand.
    pub fn set_direction(&mut self, hand: Hand, direction: Direction) {
        match hand {
            Hand::Hour => self.dir_h = direction,
            Hand::Minute => self.dir_m = direction,
        }
    }

    /// Left/right mirror: reflects both angles and swaps both directions.
    pub fn mirror_vertical(&mut self) {
        self.angle_h = angle::mirror_vertical(self.angle_h);
        self.angle_m = angle::mirror_vertical(self.angle_m);
        self.swap_directions();
    }

    /// Top/bottom mirror: reflects both angles and swaps both directions.
    pub fn mirror_horizontal(&mut self) {
        self.angle_h = angle::mirror_horizontal(self.angle_h);
        self.angle_m = angle::mirror_horizontal(self.angle_m);
        self.swap_directions();
    }

    fn swap_directions(&mut self) {
        self.dir_h = self.dir_h.opposite();
        self.dir_m = self.dir_m.opposite();
    }
}

impl Default for ClockTarget {
    fn default() -> Self {
        Self::calibration()
    }
}

/// Full display state: `grid[slave][clock]`.
pub type ClockGrid = [[ClockTarget; CLOCKS_PER_SLAVE]; SLAVE_COUNT];

/// A grid with every face in the calibration pose.
#[must_use]
pub fn calibration_grid() -> ClockGrid {
    [[ClockTarget::calibration(); CLOCKS_PER_SLAVE]; SLAVE_COUNT]
}

/// Reads one cell of a grid.
#[must_use]
pub fn cell(grid: &ClockGrid, address: CellAddress) -> &ClockTarget {
    &grid[address.slave][address.clock]
}

/// Mutable access to one cell of a grid.
pub fn cell_mut(grid: &mut ClockGrid, address: CellAddress) -> &mut ClockTarget {
    &mut grid[address.slave][address.clock]
}
