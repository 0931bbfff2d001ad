//! Configuration for the page runtime and preview
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/folio/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod layout;
mod observability;
mod serialization;
mod timing;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use layout::{parse_viewport_size, FileLayout, LayoutConfig};
pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use timing::{FileTiming, Timing};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Persistent key-value storage settings
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    /// JSON file backing the page's key-value storage
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .map(|d| d.join("folio").join("storage.json"))
                .unwrap_or_else(|| PathBuf::from("./folio-storage.json")),
        }
    }
}

/// Storage settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileStorage {
    pub path: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Animation, notification and scroll timings
    pub timing: Timing,

    /// Offsets, thresholds and viewport defaults
    pub layout: LayoutConfig,

    /// Key-value storage location
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    /// Optional [timing] section
    pub timing: Option<FileTiming>,

    /// Optional [layout] section
    pub layout: Option<FileLayout>,

    /// Optional [storage] section
    pub storage: Option<FileStorage>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("folio").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Use Config::default().to_toml() as single source of truth
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Read and parse a config file. A missing file yields defaults; a file
    /// that exists but does not parse is an error rather than a silent fallback.
    fn load_file_config(path: &Path) -> Result<FileConfig> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Cannot read config file {}", path.display()))
            }
        }
    }

    /// Build config from file sections, filling gaps with defaults
    pub(crate) fn from_file_config(file: FileConfig) -> Self {
        let storage = StorageConfig {
            path: file
                .storage
                .and_then(|s| s.path)
                .map(PathBuf::from)
                .unwrap_or_else(|| StorageConfig::default().path),
        };

        Self {
            timing: Timing::from_file(file.timing),
            layout: LayoutConfig::from_file(file.layout),
            storage,
            logging: LoggingConfig::from_file(file.logging),
        }
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FOLIO_STORAGE") {
            self.storage.path = PathBuf::from(path);
        }

        if let Some((width, height)) =
            lookup("FOLIO_VIEWPORT").and_then(|v| parse_viewport_size(&v))
        {
            self.layout.viewport_width = width;
            self.layout.viewport_height = height;
        }

        if let Some(level) = lookup("FOLIO_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Load configuration: file -> env vars -> defaults
    ///
    /// `path` overrides the default config file location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => Self::load_file_config(&path)?,
            None => FileConfig::default(),
        };

        let mut config = Self::from_file_config(file);
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }
}
