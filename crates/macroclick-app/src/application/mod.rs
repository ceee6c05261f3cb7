//! Application layer: the four activities and their coordinator.
//!
//! Each long-running activity (recording, playback, spam-clicking, hotkey
//! listening) runs as an independent concurrent unit and reports back only
//! through channels; [`controller::AppController`] is the single
//! coordinating context that owns shared state and enforces mutual
//! exclusion.

pub mod controller;
pub mod hotkey_manager;
pub mod notifications;
pub mod player;
pub mod recorder;
pub mod spam_clicker;

pub use controller::AppController;
pub use hotkey_manager::{HotkeyAction, HotkeyManager};
pub use notifications::{InputKind, Notification, NotificationReceiver, Notifier, StatusLevel};
pub use player::Player;
pub use recorder::Recorder;
pub use spam_clicker::SpamClicker;
