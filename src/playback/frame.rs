//! Rendered frames and the collaborators that consume and time them.

use std::cell::Cell;
use std::time::Instant;

use crate::models::angle::interpolate_angle;
use crate::models::{CellAddress, ClockGrid, ClockTarget, Keyframe};

/// One preview frame: the current hand angles of every face.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Keyframe the transition leaves from
    pub from_index: usize,
    /// Keyframe the transition heads to
    pub to_index: usize,
    /// Eased progress of the transition in [0, 1] (cells without a cascade offset)
    pub progress: f64,
    /// Interpolated angles; directions are those of the source keyframe
    pub grid: ClockGrid,
}

/// Receives every frame the sequencer emits.
pub trait FrameSink {
    /// Draws or records a frame.
    fn render(&mut self, frame: &Frame);
}

impl FrameSink for Vec<Frame> {
    fn render(&mut self, frame: &Frame) {
        self.push(frame.clone());
    }
}

/// Monotonic clock driving playback.
pub trait TimeSource {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Starts counting from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven time source for deterministic playback.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: Cell<u64>,
}

impl ManualTimeSource {
    /// Starts at `start_ms`.
    #[must_use]
    pub const fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    /// Moves time forward.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Jumps to an absolute time.
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Interpolated grid between two keyframes, all cells at the same `progress`.
///
/// Each hand turns in the direction stored on `from`.
#[must_use]
pub fn interpolate_grid(from: &Keyframe, to: &Keyframe, progress: f64) -> ClockGrid {
    interpolate_grid_with(from, to, |_| progress)
}

/// Interpolated grid with a per-cell progress.
pub fn interpolate_grid_with(
    from: &Keyframe,
    to: &Keyframe,
    progress_of: impl Fn(CellAddress) -> f64,
) -> ClockGrid {
    let mut grid = from.clocks;
    for cell in CellAddress::all() {
        let source = from.clock(cell);
        let target = to.clock(cell);
        let progress = progress_of(cell);
        *crate::models::clock::cell_mut(&mut grid, cell) = ClockTarget {
            angle_h: interpolate_angle(source.angle_h, target.angle_h, source.dir_h, progress),
            angle_m: interpolate_angle(source.angle_m, target.angle_m, source.dir_m, progress),
            dir_h: source.dir_h,
            dir_m: source.dir_m,
        };
    }
    grid
}
