//! # macroclick-core
//!
//! Shared library for MacroClick containing the domain model and the
//! key-identity translation layer.
//!
//! This crate is OS-independent: it has zero dependencies on input hooks,
//! UI frameworks or the filesystem. The application crate layers capture,
//! injection and storage on top of it.
//!
//! - **`keymap`** – Normalizes raw key observations (named keys, printable
//!   characters, keypad keysyms, opaque codes) into one canonical
//!   [`KeyIdentity`] with a display label, and parses persisted labels back.
//!
//! - **`domain`** – Recorded events and sessions, playback settings, and the
//!   four hotkey bindings with their fixed dispatch priority.

pub mod domain;
pub mod keymap;

pub use domain::{
    HotkeyBindings, HotkeyLabels, HotkeySlot, MouseButton, PlaybackConfig, RecordedEvent, Session,
};
pub use keymap::{KeyIdentity, NumpadKey, RawKey, SpecialKey};
