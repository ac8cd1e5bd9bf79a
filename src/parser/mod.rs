//! Parsing and serialization for choreography snapshots.
//!
//! This module reads and writes the JSON snapshot format shared with the
//! browser designer, including the defaults applied to older files.

pub mod snapshot;

// Re-export commonly used functions
pub use snapshot::{parse_snapshot, snapshot_to_json, Snapshot};
