//! Recorded events, sessions and playback settings.
//!
//! [`RecordedEvent`] serializes to the exact container shape recordings are
//! stored in: a `type` tag (`mouse_click` / `key_press` / `key_release`)
//! plus flat fields. Timestamps are seconds relative to the start of the
//! recording session, measured from a monotonic clock, never wall-clock.

use serde::{Deserialize, Serialize};

/// A mouse button, as recorded and replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// The label stored in session files.
    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }

    /// Lenient parse of a persisted button label.
    ///
    /// Legacy writers stored forms like `Button.left`; substring matching
    /// accepts those, and anything unrecognized falls back to the left
    /// button rather than failing a whole replay.
    pub fn parse_lenient(label: &str) -> MouseButton {
        let lowered = label.to_lowercase();
        if lowered.contains("right") {
            MouseButton::Right
        } else if lowered.contains("middle") {
            MouseButton::Middle
        } else {
            MouseButton::Left
        }
    }
}

/// One captured input event, tagged the way the session container stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecordedEvent {
    /// A mouse button transition at an absolute screen position.
    #[serde(rename = "mouse_click")]
    Mouse {
        x: i32,
        y: i32,
        button: String,
        pressed: bool,
        timestamp: f64,
    },
    /// A key going down.
    #[serde(rename = "key_press")]
    KeyPress { key: String, timestamp: f64 },
    /// A key going up.
    #[serde(rename = "key_release")]
    KeyRelease { key: String, timestamp: f64 },
}

impl RecordedEvent {
    /// Session-relative timestamp in seconds.
    pub fn timestamp(&self) -> f64 {
        match self {
            RecordedEvent::Mouse { timestamp, .. }
            | RecordedEvent::KeyPress { timestamp, .. }
            | RecordedEvent::KeyRelease { timestamp, .. } => *timestamp,
        }
    }

    /// One-line description for the live event log.
    pub fn log_line(&self) -> String {
        match self {
            RecordedEvent::Mouse { x, y, button, pressed, timestamp } => {
                let action = if *pressed { "Press" } else { "Release" };
                format!("[{timestamp:.2}s] Mouse {action}: {button} at ({x}, {y})")
            }
            RecordedEvent::KeyPress { key, timestamp } => {
                format!("[{timestamp:.2}s] Key Press: {key}")
            }
            RecordedEvent::KeyRelease { key, timestamp } => {
                format!("[{timestamp:.2}s] Key Release: {key}")
            }
        }
    }
}

/// An ordered recording session.
///
/// Append-only while a recording is in progress; immutable afterwards until
/// cleared or replaced by a load.
#[derive(Debug, Default, Clone)]
pub struct Session {
    events: Vec<RecordedEvent>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: RecordedEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Replaces the whole event list (used by a file load).
    pub fn replace(&mut self, events: Vec<RecordedEvent>) {
        self.events = events;
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Snapshot of the event list for a playback run. The player shares the
    /// snapshot and never mutates the session itself.
    pub fn snapshot(&self) -> std::sync::Arc<Vec<RecordedEvent>> {
        std::sync::Arc::new(self.events.clone())
    }
}

/// Settings for one playback run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Number of loops; 0 means loop until stopped.
    pub loop_count: u32,
    /// Delay between consecutive loops, in seconds.
    pub loop_delay_secs: f64,
    /// Timing multiplier; values <= 0 replay with no inter-event delay.
    pub speed_multiplier: f64,
}

impl Default for PlaybackConfig {
    /// Loops forever at recorded speed with no inter-loop delay.
    fn default() -> Self {
        Self {
            loop_count: 0,
            loop_delay_secs: 0.0,
            speed_multiplier: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn is_infinite(&self) -> bool {
        self.loop_count == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
