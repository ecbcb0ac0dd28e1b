//! # Configuration Module
//!
//! This module handles configuration management and data directory lookup for
//! Mixtape. Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`, or the platform config directory)
//! 3. command-line flags and `MIXTAPE_*` environment variables
//!
//! ## Data Storage
//!
//! Catalog artifacts are read from the platform-standard data directory unless
//! overridden:
//! - Linux: `~/.local/share/mixtape/`
//! - macOS: `~/Library/Application Support/mixtape/`
//! - Windows: `%APPDATA%\mixtape\`

use crate::algorithm::SelectionContext;
use crate::catalog::{CatalogPaths, DEFAULT_METADATA_FILE, DEFAULT_SIMILARITY_FILE, DEFAULT_SONGS_FILE};
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "mixtape";
const CONFIG_FILE: &str = "config.toml";

/// Returns the platform-appropriate data directory for Mixtape.
///
/// Unlike a database location, nothing is created here: the catalog files are
/// inputs, and a missing directory simply shows up as missing artifacts.
///
/// # Errors
///
/// Fails if the system data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Pass --data-dir or set MIXTAPE_DATA_DIR."
        )
    })?;

    Ok(data_dir.join(APP_DIR))
}

/// Default location of the optional config file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Album art retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Total tries per image, including the first.
    pub attempts: u32,
    /// Pause between tries.
    pub delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Edge length of the square the image is resized to.
    pub size: u32,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 2000,
            timeout_secs: 10,
            size: 200,
        }
    }
}

impl ArtworkConfig {
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory holding the catalog artifacts
    pub data_dir: PathBuf,
    pub songs_file: String,
    pub similarity_file: String,
    pub metadata_file: String,
    pub selection: SelectionContext,
    pub artwork: ArtworkConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: get_data_dir().unwrap_or_else(|_| PathBuf::from(".")),
            songs_file: DEFAULT_SONGS_FILE.to_string(),
            similarity_file: DEFAULT_SIMILARITY_FILE.to_string(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            selection: SelectionContext::default(),
            artwork: ArtworkConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a TOML config file. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Resolve configuration from an explicit file, the default file if it
    /// exists, or built-in defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    ///
    /// # Errors
    ///
    /// Propagates [`RuntimeConfig::from_file`] failures.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Using config file {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Create configuration with explicit data directory
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Full paths of the three catalog artifacts.
    #[must_use]
    pub fn catalog_paths(&self) -> CatalogPaths {
        CatalogPaths {
            songs: self.data_dir.join(&self.songs_file),
            similarity: self.data_dir.join(&self.similarity_file),
            metadata: self.data_dir.join(&self.metadata_file),
        }
    }
}
