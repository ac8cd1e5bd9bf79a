//! Preview playback: timed, loop-aware transitions between keyframes.
//!
//! The [`Sequencer`] is a pure state machine advanced by explicit ticks.
//! Rendering and timekeeping are left to [`FrameSink`] and [`TimeSource`]
//! implementations supplied by the embedding application.

pub mod frame;
pub mod sequencer;

pub use frame::{
    interpolate_grid, Frame, FrameSink, ManualTimeSource, SystemTimeSource, TimeSource,
};
pub use sequencer::{PlaybackSettings, PlaybackState, PlaybackToggle, Sequencer};
