//! Service layer for editing, persistence and session logic.
//!
//! This module contains services that encapsulate editing rules and
//! coordinate between models, playback and project files.

pub mod clipboard;
pub mod keyframe_store;
pub mod project;
pub mod session;

// Re-export commonly used types and functions
pub use clipboard::ClockClipboard;
pub use keyframe_store::{KeyframeStore, Reorder};
pub use project::ProjectService;
pub use session::EditorSession;
