//! Project file I/O service.
//!
//! This module centralizes snapshot file operations, providing a consistent
//! interface for loading, saving and naming choreography project files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::parser::{self, Snapshot};

/// Extension of project files.
pub const PROJECT_EXTENSION: &str = "json";

/// Service for managing project file I/O operations.
pub struct ProjectService;

impl ProjectService {
    /// Loads a snapshot from a JSON project file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use clockchoreo::services::ProjectService;
    ///
    /// let snapshot = ProjectService::load(Path::new("wave.json"))?;
    /// println!("{} keyframes", snapshot.keyframes.len());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<Snapshot> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;
        let snapshot = parser::parse_snapshot(&content)
            .with_context(|| format!("Failed to load project from {}", path.display()))?;
        info!(path = %path.display(), name = %snapshot.name, "Loaded project");
        Ok(snapshot)
    }

    /// Saves a snapshot as pretty-printed JSON.
    ///
    /// This performs an atomic write using a temp file + rename pattern to ensure
    /// the file is never left in a corrupted state. Missing parent directories
    /// are created.
    pub fn save(snapshot: &Snapshot, path: &Path) -> Result<()> {
        let content = parser::snapshot_to_json(snapshot)
            .with_context(|| format!("Failed to serialize project {}", snapshot.name))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create project directory: {}", parent.display())
            })?;
        }

        atomic_write(path, &content)
            .with_context(|| format!("Failed to save project to {}", path.display()))?;
        info!(path = %path.display(), keyframes = snapshot.keyframes.len(), "Saved project");
        Ok(())
    }

    /// Path of the project file for `name` inside `dir`.
    #[must_use]
    pub fn project_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.{PROJECT_EXTENSION}", sanitize_filename(name)))
    }

    /// Directory for project files.
    ///
    /// Uses `project.projects_dir` from the config when set, otherwise:
    ///
    /// - Linux: `~/.config/ClockChoreo/projects/`
    /// - macOS: `~/Library/Application Support/ClockChoreo/projects/`
    /// - Windows: `%APPDATA%\ClockChoreo\projects\`
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the platform config
    /// directory cannot be determined.
    pub fn default_projects_dir(config: &Config) -> Result<PathBuf> {
        if let Some(dir) = &config.project.projects_dir {
            return Ok(dir.clone());
        }
        Ok(Config::config_dir()?.join("projects"))
    }

    /// Renames a project file if the project name has changed.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(PathBuf))` - File was renamed, returns the new path
    /// * `Ok(None)` - No rename needed (same filename or file doesn't exist)
    /// * `Err(...)` - Failed to rename file
    pub fn rename_file_if_needed(old_path: &Path, new_name: &str) -> Result<Option<PathBuf>> {
        if !old_path.exists() {
            return Ok(None);
        }

        let parent = old_path
            .parent()
            .context("Project file has no parent directory")?;
        let new_path = Self::project_path(parent, new_name);
        if new_path == old_path {
            return Ok(None);
        }

        fs::rename(old_path, &new_path).with_context(|| {
            format!(
                "Failed to rename project file from {} to {}",
                old_path.display(),
                new_path.display()
            )
        })?;

        Ok(Some(new_path))
    }
}

/// Performs an atomic file write using temp file + rename pattern.
fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write to temporary file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}

/// Sanitizes a project name for use as a filename.
///
/// Replaces problematic characters with underscores and converts to lowercase.
///
/// # Examples
///
/// ```
/// # use clockchoreo::services::project::sanitize_filename;
/// assert_eq!(sanitize_filename("My Wave"), "my_wave");
/// assert_eq!(sanitize_filename("Show/Part:2"), "show_part_2");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\', ':', ' '], "_").to_lowercase()
}
