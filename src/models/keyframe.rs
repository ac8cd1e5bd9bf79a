//! Keyframe data structures and cascade timing.

use crate::constants::{
    CLOCKS_PER_SLAVE, DEFAULT_ACCEL, DEFAULT_CASCADE_DELAY_MS, DEFAULT_DELAY_MS, DEFAULT_SPEED,
    MAX_ACCEL, MAX_DELAY_MS, MAX_SPEED, MIN_ACCEL, MIN_SPEED, SLAVE_COUNT,
    STEPS_PER_QUARTER_TURN, TRANSITION_MARGIN_MS,
};
use crate::models::clock::{calibration_grid, CellAddress, ClockGrid, ClockTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Suffix appended to the comment of a duplicated keyframe.
pub const DUPLICATE_SUFFIX: &str = " (copy)";

/// Rule spreading extra per-cell start delay across a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeMode {
    /// Every cell starts together
    #[default]
    None,
    /// Column by column, left to right
    Column,
    /// Row by row, top to bottom
    Row,
    /// Diagonal wave from the top-left corner
    Diagonal,
    /// Rings spreading from the centre outward
    Ripple,
    /// Rings closing from the edges to the centre
    RippleIn,
    /// Left-to-right on even rows, right-to-left on odd rows
    Snake,
    /// Fixed spiral order starting at the centre
    Spiral,
}

/// Spiral start order, indexed `[slave][clock]`.
const SPIRAL_ORDER: [[u64; CLOCKS_PER_SLAVE]; SLAVE_COUNT] = [
    [6, 5, 7],
    [4, 3, 8],
    [2, 1, 9],
    [1, 0, 10],
    [1, 0, 10],
    [2, 1, 9],
    [4, 3, 8],
    [6, 5, 7],
];

/// Outermost ripple ring on the 8×3 grid.
const MAX_RIPPLE_RING: u64 = 4;

impl CascadeMode {
    /// All modes, in firmware numbering order.
    pub const ALL: [Self; 8] = [
        Self::None,
        Self::Column,
        Self::Row,
        Self::Diagonal,
        Self::Ripple,
        Self::RippleIn,
        Self::Snake,
        Self::Spiral,
    ];

    /// Numeric value used by the controller firmware.
    #[must_use]
    pub const fn firmware_value(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Column => 1,
            Self::Row => 2,
            Self::Diagonal => 3,
            Self::Ripple => 4,
            Self::RippleIn => 5,
            Self::Snake => 6,
            Self::Spiral => 7,
        }
    }

    /// Name as written in snapshot files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Column => "column",
            Self::Row => "row",
            Self::Diagonal => "diagonal",
            Self::Ripple => "ripple",
            Self::RippleIn => "ripple_in",
            Self::Snake => "snake",
            Self::Spiral => "spiral",
        }
    }

    /// Parses a snapshot name; unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == name)
    }

    /// Start offset of `cell` in cascade steps (multiply by the cascade delay).
    #[must_use]
    pub fn step(self, cell: CellAddress) -> u64 {
        let slave = cell.slave() as u64;
        let clock = cell.clock() as u64;
        match self {
            Self::None => 0,
            Self::Column => slave,
            Self::Row => clock,
            Self::Diagonal => slave + clock,
            Self::Ripple => ripple_ring(cell),
            Self::RippleIn => MAX_RIPPLE_RING.saturating_sub(ripple_ring(cell)),
            Self::Snake => {
                let along = if clock % 2 == 0 {
                    slave
                } else {
                    SLAVE_COUNT as u64 - 1 - slave
                };
                clock * SLAVE_COUNT as u64 + along
            }
            Self::Spiral => SPIRAL_ORDER[cell.slave()][cell.clock()],
        }
    }
}

impl fmt::Display for CascadeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance ring of a cell from the grid centre (slave 3.5, clock 1), rounded half up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ripple_ring(cell: CellAddress) -> u64 {
    let ds = cell.slave() as f64 - 3.5;
    let dc = cell.clock() as f64 - 1.0;
    (ds.hypot(dc) + 0.5).floor() as u64
}

/// Start offset of `cell` for `mode`, in milliseconds.
#[must_use]
pub fn cascade_offset_ms(mode: CascadeMode, cell: CellAddress, cascade_delay_ms: u32) -> u64 {
    mode.step(cell) * u64::from(cascade_delay_ms)
}

/// Generates a new unique keyframe ID.
fn generate_keyframe_id() -> String {
    Uuid::new_v4().to_string()
}

/// One stop on the choreography timeline: a full-grid pose plus motion parameters.
///
/// # Validation
///
/// - `speed` within [200, 5000] steps/sec
/// - `accel` within [100, 2000] steps/sec²
/// - `delay_ms` and `cascade_delay_ms` at most 65535 ms
/// - angles normalized to [0, 360)
///
/// The setters enforce these; fields stay public for read access by
/// exporters and renderers. Only serialization is derived: files come back
/// in through [`crate::parser::parse_snapshot`], which applies the same rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Opaque unique identifier (stable across reorders)
    pub id: String,
    /// Free-form note shown on the timeline
    pub comment: String,
    /// Motor speed in steps/sec
    pub speed: u32,
    /// Acceleration in steps/sec²
    pub accel: u32,
    /// Hold time after reaching this keyframe, in milliseconds
    pub delay_ms: u32,
    /// How start times are staggered across the grid
    pub cascade_mode: CascadeMode,
    /// Delay between cascade groups, in milliseconds
    pub cascade_delay_ms: u32,
    /// Per-face targets, `clocks[slave][clock]`
    pub clocks: ClockGrid,
}

impl Keyframe {
    /// Creates a keyframe in the calibration pose with default motion parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: generate_keyframe_id(),
            comment: String::new(),
            speed: DEFAULT_SPEED,
            accel: DEFAULT_ACCEL,
            delay_ms: DEFAULT_DELAY_MS,
            cascade_mode: CascadeMode::None,
            cascade_delay_ms: DEFAULT_CASCADE_DELAY_MS,
            clocks: calibration_grid(),
        }
    }

    /// Deep copy with a fresh ID and an annotated comment.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: generate_keyframe_id(),
            comment: format!("{}{}", self.comment, DUPLICATE_SUFFIX),
            ..self.clone()
        }
    }

    /// Target of one clock face.
    #[must_use]
    pub fn clock(&self, cell: CellAddress) -> &ClockTarget {
        crate::models::clock::cell(&self.clocks, cell)
    }

    /// Mutable target of one clock face.
    pub fn clock_mut(&mut self, cell: CellAddress) -> &mut ClockTarget {
        crate::models::clock::cell_mut(&mut self.clocks, cell)
    }

    /// Sets the comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Sets the speed, clamped to the supported range.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Sets the acceleration, clamped to the supported range.
    pub fn set_accel(&mut self, accel: u32) {
        self.accel = accel.clamp(MIN_ACCEL, MAX_ACCEL);
    }

    /// Sets the hold time after this keyframe, capped at [`MAX_DELAY_MS`].
    pub fn set_delay_ms(&mut self, delay_ms: u32) {
        self.delay_ms = delay_ms.min(MAX_DELAY_MS);
    }

    /// Sets the cascade mode.
    pub fn set_cascade_mode(&mut self, mode: CascadeMode) {
        self.cascade_mode = mode;
    }

    /// Sets the delay between cascade groups, capped at [`MAX_DELAY_MS`].
    pub fn set_cascade_delay_ms(&mut self, cascade_delay_ms: u32) {
        self.cascade_delay_ms = cascade_delay_ms.min(MAX_DELAY_MS);
    }

    /// Start offset of `cell` when leaving this keyframe, in milliseconds.
    #[must_use]
    pub fn cascade_offset_ms(&self, cell: CellAddress) -> u64 {
        cascade_offset_ms(self.cascade_mode, cell, self.cascade_delay_ms)
    }

    /// Largest start offset across the grid.
    #[must_use]
    pub fn max_cascade_offset_ms(&self) -> u64 {
        CellAddress::all()
            .map(|cell| self.cascade_offset_ms(cell))
            .max()
            .unwrap_or(0)
    }

    /// Controller's estimate of a transition at this speed (a 90° move plus margin).
    #[must_use]
    pub fn estimated_transition_ms(&self) -> u32 {
        (STEPS_PER_QUARTER_TURN / self.speed.max(1)) * 1000 + TRANSITION_MARGIN_MS
    }
}

impl Default for Keyframe {
    fn default() -> Self {
        Self::new()
    }
}
