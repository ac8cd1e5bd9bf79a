//! Data models for keyframes, loop markers and grid selection.
//!
//! This module contains the core data structures used throughout the crate.
//! Models are independent of playback and persistence.

pub mod angle;
pub mod clock;
pub mod keyframe;
pub mod loop_range;
pub mod selection;

// Re-export all model types
pub use angle::{Direction, Hand};
pub use clock::{CellAddress, ClockGrid, ClockTarget};
pub use keyframe::{CascadeMode, Keyframe};
pub use loop_range::LoopRange;
pub use selection::Selection;
