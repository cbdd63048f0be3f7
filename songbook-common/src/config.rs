//! Configuration loading and the process-wide settings snapshot
//!
//! # Settings Sources Priority
//!
//! 1. Explicit config path (command-line `--config`)
//! 2. Environment variable (`SONGBOOK_CONFIG`)
//! 3. TOML file in the platform config directory (`<config>/songbook/config.toml`)
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error: a warning is logged and defaults are
//! used. A file that exists but cannot be parsed is reported as
//! [`Error::Config`].

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SONGBOOK_CONFIG";

/// Tag and aggregation settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rating reported for tracks without `~#rating`
    ///
    /// Valid range: [0.0, 1.0]
    /// Default: 0.5
    pub default_rating: f64,

    /// Number of stars used when rendering a rating
    ///
    /// Default: 4
    pub rating_stars: u32,

    /// Prior weight of the Bayesian rating average (0 disables the prior)
    ///
    /// Default: 0.0
    pub bayesian_rating_factor: f64,

    /// Root of the external lyrics store
    pub lyrics_dir: PathBuf,

    /// Directory holding one file per playlist
    pub playlist_dir: PathBuf,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_rating: 0.5,
            rating_stars: 4,
            bayesian_rating_factor: 0.0,
            lyrics_dir: default_lyrics_dir(),
            playlist_dir: default_playlist_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Load settings from a TOML file
    ///
    /// Missing file → defaults (with a warning). Unreadable or malformed
    /// file → [`Error::Config`].
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "Loading settings");
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Resolve and load settings following the documented priority order
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => Self::load(&path),
            None => {
                debug!("No config file located, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Locate the config file to read, if any
///
/// Returns the CLI path or the environment path unconditionally (so a typo
/// is reported by [`Settings::load`]); the platform default only if it exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("songbook").join("config.toml"))
        .filter(|p| p.exists())
}

fn default_lyrics_dir() -> PathBuf {
    dirs::home_dir()
        .map(|d| d.join(".lyrics"))
        .unwrap_or_else(|| PathBuf::from(".lyrics"))
}

fn default_playlist_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songbook").join("playlists"))
        .unwrap_or_else(|| PathBuf::from("./songbook_data/playlists"))
}

// ============================================================================
// Process-wide settings
// ============================================================================

/// Active settings
///
/// Read-frequently (every rating lookup), write-rarely (startup).
static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

/// Snapshot of the active settings
pub fn settings() -> Settings {
    match SETTINGS.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the active settings
pub fn install(new_settings: Settings) {
    match SETTINGS.write() {
        Ok(mut guard) => *guard = new_settings,
        Err(poisoned) => *poisoned.into_inner() = new_settings,
    }
}
