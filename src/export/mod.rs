//! Export of choreographies for the clock controller.
//!
//! Currently generates the C program fragment embedded in the controller
//! sketch: keyframe tables, loop configuration and a player function.

pub mod firmware;

pub use firmware::{c_identifier, FirmwareExporter};
