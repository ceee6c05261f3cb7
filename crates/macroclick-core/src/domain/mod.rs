//! OS-independent domain types: events, sessions, playback settings and
//! hotkey bindings.

pub mod event;
pub mod hotkeys;

pub use event::{MouseButton, PlaybackConfig, RecordedEvent, Session};
pub use hotkeys::{HotkeyBindings, HotkeyLabels, HotkeySlot};
