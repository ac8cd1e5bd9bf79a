//! Configuration management for the editor.
//!
//! This module handles loading, validating, and saving editor preferences
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    APP_NAME, DEFAULT_LOOP_COUNT, DEFAULT_PAUSE_MS, DEFAULT_PROJECT_NAME, DEFAULT_TRANSITION_MS,
};
use crate::playback::PlaybackSettings;

/// Preview playback preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Transition length between keyframes (ms)
    pub transition_ms: u32,
    /// Pause between transitions (ms)
    pub pause_ms: u32,
    /// Preview cascade start offsets
    pub apply_cascade: bool,
    /// Add each keyframe's own delay to the pause
    pub honor_keyframe_delay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            transition_ms: DEFAULT_TRANSITION_MS,
            pause_ms: DEFAULT_PAUSE_MS,
            apply_cascade: false,
            honor_keyframe_delay: false,
        }
    }
}

impl From<PlaybackConfig> for PlaybackSettings {
    fn from(config: PlaybackConfig) -> Self {
        Self {
            transition_ms: config.transition_ms,
            pause_ms: config.pause_ms,
            apply_cascade: config.apply_cascade,
            honor_keyframe_delay: config.honor_keyframe_delay,
        }
    }
}

/// Defaults for new projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Name given to new projects
    pub default_name: String,
    /// Loop repeat count for new projects (0 = infinite)
    pub default_loop_count: u32,
    /// Where project files are saved (platform default when unset)
    pub projects_dir: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_PROJECT_NAME.to_string(),
            default_loop_count: DEFAULT_LOOP_COUNT,
            projects_dir: None,
        }
    }
}

/// Editor configuration.
///
/// # File Location
///
/// - Linux: `~/.config/ClockChoreo/config.toml`
/// - macOS: `~/Library/Application Support/ClockChoreo/config.toml`
/// - Windows: `%APPDATA%\ClockChoreo\config.toml`
///
/// # Validation
///
/// - `transition_ms` must be greater than zero
/// - `default_name` must not be blank
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preview playback preferences
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// New-project defaults
    #[serde(default)]
    pub project: ProjectConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the platform config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the platform config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp config file to: {}", path.display())
        })?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.playback.transition_ms == 0 {
            anyhow::bail!("Playback transition_ms must be greater than zero");
        }
        if self.project.default_name.trim().is_empty() {
            anyhow::bail!("Project default_name must not be empty");
        }
        Ok(())
    }

    /// Playback settings for the sequencer.
    #[must_use]
    pub fn playback_settings(&self) -> PlaybackSettings {
        self.playback.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.playback.transition_ms, 1000);
        assert_eq!(config.playback.pause_ms, 500);
        assert!(!config.playback.apply_cascade);
        assert_eq!(config.project.default_name, "choreographie");
        assert_eq!(config.project.default_loop_count, 3);
        assert!(config.project.projects_dir.is_none());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::new();
        assert!(config.validate().is_ok());

        config.playback.transition_ms = 0;
        assert!(config.validate().is_err());

        config.playback.transition_ms = 800;
        config.project.default_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.playback.pause_ms = 250;
        config.playback.honor_keyframe_delay = true;
        config.project.projects_dir = Some(temp_dir.path().join("shows"));
        config.save_to(&path)?;
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_config_load_missing_gives_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let loaded = Config::load_from(&temp_dir.path().join("absent.toml"))?;
        assert_eq!(loaded, Config::default());
        Ok(())
    }

    #[test]
    fn test_config_partial_file_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[playback]\npause_ms = 100\n")?;

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded.playback.pause_ms, 100);
        assert_eq!(loaded.playback.transition_ms, 1000);
        assert_eq!(loaded.project, ProjectConfig::default());
        Ok(())
    }

    #[test]
    fn test_config_rejects_invalid_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[playback]\ntransition_ms = 0\n")?;
        assert!(Config::load_from(&path).is_err());

        fs::write(&path, "not = [valid")?;
        assert!(Config::load_from(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_save_rejects_invalid_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        let mut config = Config::new();
        config.playback.transition_ms = 0;
        assert!(config.save_to(&path).is_err());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_playback_settings_conversion() {
        let mut config = Config::new();
        config.playback.apply_cascade = true;
        config.playback.transition_ms = 1500;
        let settings = config.playback_settings();
        assert_eq!(settings.transition_ms, 1500);
        assert_eq!(settings.pause_ms, 500);
        assert!(settings.apply_cascade);
        assert!(!settings.honor_keyframe_delay);
    }

    #[test]
    fn test_config_dir_uses_app_name() {
        if let Ok(dir) = Config::config_dir() {
            assert!(dir.ends_with("ClockChoreo"));
        }
    }
}
