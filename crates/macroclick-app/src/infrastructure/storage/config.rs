//! TOML-based application configuration.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\MacroClick\config.toml`
//! - Linux:    `~/.config/macroclick/config.toml`
//! - macOS:    `~/Library/Application Support/MacroClick/config.toml`
//!
//! Fields annotated with `#[serde(default = ...)]` fall back to their
//! defaults when absent, so the app works on first run and when upgrading
//! from an older config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use macroclick_core::{HotkeyLabels, PlaybackConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub playback: PlaybackDefaults,
    #[serde(default)]
    pub spam: SpamConfig,
    #[serde(default)]
    pub hotkeys: HotkeyLabels,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Default playback settings applied at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackDefaults {
    /// Loop count; 0 = infinite.
    #[serde(default)]
    pub loop_count: u32,
    /// Delay between loops in seconds.
    #[serde(default)]
    pub loop_delay_secs: f64,
    /// Playback speed multiplier.
    #[serde(default = "default_speed")]
    pub speed_multiplier: f64,
}

/// Spam-clicker settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpamConfig {
    /// Delay between click cycles in milliseconds.
    #[serde(default = "default_spam_interval_ms")]
    pub interval_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_speed() -> f64 {
    1.0
}
fn default_spam_interval_ms() -> u64 {
    10
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            loop_count: 0,
            loop_delay_secs: 0.0,
            speed_multiplier: default_speed(),
        }
    }
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self { interval_ms: default_spam_interval_ms() }
    }
}

impl PlaybackDefaults {
    pub fn to_playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            loop_count: self.loop_count,
            loop_delay_secs: self.loop_delay_secs,
            speed_multiplier: self.speed_multiplier,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config
/// base directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`AppConfig`] from disk, returning `AppConfig::default()` if the
/// file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk, creating the config directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("MacroClick"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("macroclick"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/MacroClick
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("MacroClick")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
