//! Recording container persistence.
//!
//! Two accepted on-disk shapes, both JSON:
//!
//! - **Legacy**: a bare array of event objects.
//! - **Current**: `{"events": [...], "config": {"loops": .., "delay": ..,
//!   "speed": .., "hotkeys": {"record": "F1", ...}}}`.
//!
//! Loading is all-or-nothing: every event must be an object carrying `type`
//! and `timestamp` and must parse as a [`RecordedEvent`], otherwise the
//! whole load fails with an error naming the offending index. Hotkey labels
//! inside `config` are display strings; callers re-resolve them through
//! `KeyIdentity::parse`, which tolerates the stray quote characters some
//! legacy writers emitted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use macroclick_core::{HotkeyLabels, PlaybackConfig, RecordedEvent};

/// Error type for recording file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing recording at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse recording JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON is valid but not one of the two accepted container shapes.
    #[error("invalid recording shape: {0}")]
    InvalidShape(String),

    /// One event inside the container is malformed.
    #[error("invalid event at index {index}: {reason}")]
    InvalidEvent { index: usize, reason: String },

    /// Saving was requested with nothing to save.
    #[error("there are no recorded events to save")]
    NoEvents,
}

/// Playback settings and hotkey labels stored alongside the events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Loop count; 0 = infinite.
    #[serde(default)]
    pub loops: u32,
    /// Delay between loops in seconds.
    #[serde(default)]
    pub delay: f64,
    /// Playback speed multiplier.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Display labels of the four hotkey slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkeys: Option<HotkeyLabels>,
}

fn default_speed() -> f64 {
    1.0
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            loops: 0,
            delay: 0.0,
            speed: default_speed(),
            hotkeys: None,
        }
    }
}

impl RecordingConfig {
    /// The playback settings this config describes.
    pub fn playback(&self) -> PlaybackConfig {
        PlaybackConfig {
            loop_count: self.loops,
            loop_delay_secs: self.delay,
            speed_multiplier: self.speed,
        }
    }
}

/// A successfully loaded recording.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecording {
    pub events: Vec<RecordedEvent>,
    pub config: RecordingConfig,
}

/// Loads a recording file, accepting both container shapes.
///
/// # Errors
///
/// [`StorageError::Io`] for file-system failures, otherwise the parse errors
/// documented on [`parse_recording`].
pub fn load_recording(path: &Path) -> Result<LoadedRecording, StorageError> {
    let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_recording(&content)
}

/// Parses recording JSON, accepting both container shapes.
///
/// # Errors
///
/// [`StorageError::Parse`] for invalid JSON, [`StorageError::InvalidShape`]
/// for a container that is neither shape, [`StorageError::InvalidEvent`]
/// for a malformed event. Nothing is partially applied on failure.
pub fn parse_recording(json: &str) -> Result<LoadedRecording, StorageError> {
    let document: Value = serde_json::from_str(json)?;

    let (raw_events, config) = match document {
        // Legacy shape: bare array of events, no config.
        Value::Array(events) => (events, RecordingConfig::default()),
        // Current shape: {"events": [...], "config": {...}}.
        Value::Object(mut fields) => {
            let events = match fields.remove("events") {
                Some(Value::Array(events)) => events,
                Some(_) => {
                    return Err(StorageError::InvalidShape(
                        "\"events\" must be an array".to_string(),
                    ))
                }
                None => {
                    return Err(StorageError::InvalidShape(
                        "expected an event array or an object with an \"events\" array".to_string(),
                    ))
                }
            };
            let config = match fields.remove("config") {
                Some(config) => serde_json::from_value(config)?,
                None => RecordingConfig::default(),
            };
            (events, config)
        }
        other => {
            return Err(StorageError::InvalidShape(format!(
                "expected array or object, found {}",
                value_kind(&other)
            )))
        }
    };

    let mut events = Vec::with_capacity(raw_events.len());
    for (index, raw) in raw_events.into_iter().enumerate() {
        let object = raw.as_object().ok_or_else(|| StorageError::InvalidEvent {
            index,
            reason: "expected an object".to_string(),
        })?;
        // Check the required fields by name first so the error says what is
        // actually missing instead of a serde tag message.
        for field in ["type", "timestamp"] {
            if !object.contains_key(field) {
                return Err(StorageError::InvalidEvent {
                    index,
                    reason: format!("missing required field \"{field}\""),
                });
            }
        }
        let event: RecordedEvent =
            serde_json::from_value(raw).map_err(|e| StorageError::InvalidEvent {
                index,
                reason: e.to_string(),
            })?;
        events.push(event);
    }

    Ok(LoadedRecording { events, config })
}

/// Saves a recording in the current container shape.
///
/// Creates parent directories as needed.
///
/// # Errors
///
/// [`StorageError::NoEvents`] when the event list is empty, otherwise
/// [`StorageError::Io`] / [`StorageError::Parse`] for write and
/// serialization failures.
pub fn save_recording(
    path: &Path,
    events: &[RecordedEvent],
    config: &RecordingConfig,
) -> Result<(), StorageError> {
    if events.is_empty() {
        return Err(StorageError::NoEvents);
    }

    let document = serde_json::json!({
        "events": events,
        "config": config,
    });
    let content = serde_json::to_string_pretty(&document)?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
