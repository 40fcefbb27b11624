//! Configuration management for flyout.
//!
//! Configuration is loaded from the first TOML file found in:
//! 1. the path given with `--config`
//! 2. `%APPDATA%/flyout/config.toml` (Windows standard)
//! 3. `~/.config/flyout/config.toml` (Unix-style, for WSL compatibility)
//! 4. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use flyout_dock_layout::LogicalSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MIN_WINDOW_SIZE: f64 = 120.0;
pub const MAX_WINDOW_SIZE: f64 = 2000.0;
pub const MAX_GAP: f64 = 64.0;

/// Main configuration structure for flyout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Popup window geometry.
    pub window: WindowConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
    /// Notification icon configuration.
    pub tray: TrayConfig,
}

/// Popup window geometry, in logical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    /// Distance kept between the popup and the taskbar.
    #[serde(default = "default_gap")]
    pub gap: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            gap: default_gap(),
        }
    }
}

impl WindowConfig {
    pub fn size(&self) -> LogicalSize {
        LogicalSize::new(self.width, self.height)
    }
}

/// Behavior-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Open the popup pinned at startup.
    pub start_pinned: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            start_pinned: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    /// Tooltip shown when hovering the notify icon.
    #[serde(default = "default_tooltip")]
    pub tooltip: String,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            tooltip: default_tooltip(),
        }
    }
}

fn default_width() -> f64 {
    300.0
}

fn default_height() -> f64 {
    400.0
}

fn default_gap() -> f64 {
    8.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tooltip() -> String {
    "flyout".to_string()
}

/// A value that was out of range and has been replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl Config {
    /// Load configuration from `path` if given, else from the standard
    /// locations. Returns the default config if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::load_from_path(path);
        }

        for path in &config_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Clamp out-of-range values, reporting each replacement.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        clamp_field(
            "window.width",
            &mut self.window.width,
            MIN_WINDOW_SIZE,
            MAX_WINDOW_SIZE,
            default_width(),
            &mut warnings,
        );
        clamp_field(
            "window.height",
            &mut self.window.height,
            MIN_WINDOW_SIZE,
            MAX_WINDOW_SIZE,
            default_height(),
            &mut warnings,
        );
        clamp_field(
            "window.gap",
            &mut self.window.gap,
            0.0,
            MAX_GAP,
            default_gap(),
            &mut warnings,
        );

        if !matches!(
            self.behavior.log_level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            warnings.push(ConfigWarning {
                field: "behavior.log_level",
                message: format!(
                    "unknown level '{}', using '{}'",
                    self.behavior.log_level,
                    default_log_level()
                ),
            });
            self.behavior.log_level = default_log_level();
        }

        warnings
    }
}

fn clamp_field(
    field: &'static str,
    value: &mut f64,
    min: f64,
    max: f64,
    fallback: f64,
    warnings: &mut Vec<ConfigWarning>,
) {
    if !value.is_finite() {
        warnings.push(ConfigWarning {
            field,
            message: format!("{} is not a number, using {}", value, fallback),
        });
        *value = fallback;
    } else if *value < min || *value > max {
        let clamped = value.clamp(min, max);
        warnings.push(ConfigWarning {
            field,
            message: format!("{} is outside [{}, {}], clamped to {}", value, min, max, clamped),
        });
        *value = clamped;
    }
}

/// Get all standard config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Windows standard: %APPDATA%/flyout/config.toml
    if let Some(proj_dirs) = ProjectDirs::from("", "", "flyout") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    // 2. Unix-style: ~/.config/flyout/config.toml
    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("flyout").join("config.toml"));
    }

    // 3. Current directory: ./config.toml
    paths.push(PathBuf::from("config.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 300.0);
        assert_eq!(config.window.height, 400.0);
        assert_eq!(config.window.gap, 8.0);
        assert_eq!(config.behavior.log_level, "info");
        assert!(!config.behavior.start_pinned);
        assert_eq!(config.tray.tooltip, "flyout");
    }

    #[test]
    fn test_config_partial_parse() {
        let config: Config = toml::from_str(
            r#"
            [window]
            width = 360.0

            [behavior]
            start_pinned = true
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 360.0);
        assert_eq!(config.window.height, 400.0);
        assert!(config.behavior.start_pinned);
        assert_eq!(config.behavior.log_level, "info");
    }

    #[test]
    fn test_config_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_rejects_wrong_types() {
        let result: Result<Config, _> = toml::from_str("[window]\nwidth = \"wide\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let mut config = Config::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_clamps_sizes() {
        let mut config = Config::default();
        config.window.width = 50.0;
        config.window.height = 5000.0;
        config.window.gap = -3.0;

        let warnings = config.validate();
        let fields: Vec<_> = warnings.iter().map(|w| w.field).collect();
        assert_eq!(fields, vec!["window.width", "window.height", "window.gap"]);
        assert_eq!(config.window.width, MIN_WINDOW_SIZE);
        assert_eq!(config.window.height, MAX_WINDOW_SIZE);
        assert_eq!(config.window.gap, 0.0);
    }

    #[test]
    fn test_validate_replaces_nan() {
        let mut config = Config::default();
        config.window.width = f64::NAN;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.window.width, 300.0);
    }

    #[test]
    fn test_validate_unknown_log_level() {
        let mut config = Config::default();
        config.behavior.log_level = "loud".to_string();
        let warnings = config.validate();
        assert_eq!(warnings[0].field, "behavior.log_level");
        assert_eq!(config.behavior.log_level, "info");

        config.behavior.log_level = "DEBUG".to_string();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_config_paths_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty());
        assert_eq!(paths.last(), Some(&PathBuf::from("config.toml")));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("does/not/exist/flyout.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join(format!("flyout-test-{}.toml", std::process::id()));
        fs::write(&path, "[tray]\ntooltip = \"Quick panel\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.tray.tooltip, "Quick panel");
        assert_eq!(config.window, WindowConfig::default());
    }
}
