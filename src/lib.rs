//! Clock Choreography Library
//!
//! This library provides the core of a choreography editor for an 8×3 grid
//! of motorized analog clocks: the keyframe timeline, loop markers, grid
//! selection, direction-constrained angle interpolation, a loop-aware
//! preview sequencer, snapshot files and controller code export.
//!
//! The library never installs a `tracing` subscriber; embedding
//! applications decide where logs go.

// Module declarations
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod models;
pub mod parser;
pub mod playback;
pub mod services;

pub use error::{ChoreoError, ChoreoResult};
