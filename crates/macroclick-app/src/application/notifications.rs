//! Observer notifications.
//!
//! Background activities never touch UI-adjacent state directly: everything
//! they want the coordinator (or a UI) to see is posted as a
//! [`Notification`] over an unbounded channel. Senders are cheap clones and
//! safe to call from any thread; a dropped receiver simply discards
//! notifications, which keeps the activities alive in headless runs.

use macroclick_core::HotkeySlot;
use tokio::sync::mpsc;

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Which device a live-input notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Mouse,
    Key,
}

/// A single observer notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A status line changed ("Recording...", "Playback stopped!", ...).
    Status { text: String, level: StatusLevel },
    /// A recorded event was appended to the live log.
    EventLogged { line: String },
    /// An input was observed or injected, for the live-input display.
    LiveInput { kind: InputKind, text: String },
    /// Remaining seconds of an inter-loop delay.
    CountdownTick { remaining_secs: f64 },
    /// A playback run terminated (completed or stopped). Fires exactly once
    /// per run.
    PlaybackFinished,
    /// A hotkey slot received a new binding.
    HotkeyCaptured { slot: HotkeySlot, label: String },
}

pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Cloneable sending side of the notification channel.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Creates a notifier and the receiver the coordinator drains.
    pub fn channel() -> (Notifier, NotificationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, rx)
    }

    /// Posts a notification. Silently drops it if nobody is listening.
    pub fn send(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }

    /// Posts a status message.
    pub fn status(&self, text: impl Into<String>, level: StatusLevel) {
        self.send(Notification::Status { text: text.into(), level });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
