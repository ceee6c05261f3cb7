//! Hotkey slots and bindings.
//!
//! Four actions carry a global trigger key each. Matching walks the slots in
//! a fixed priority order, so a key bound to more than one slot always fires
//! the highest-priority action and nothing else.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::keymap::{KeyIdentity, SpecialKey};

/// The four bindable actions, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeySlot {
    Record,
    Play,
    Stop,
    Spam,
}

impl HotkeySlot {
    /// Dispatch priority: first match wins.
    pub const IN_PRIORITY_ORDER: [HotkeySlot; 4] = [
        HotkeySlot::Record,
        HotkeySlot::Play,
        HotkeySlot::Stop,
        HotkeySlot::Spam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HotkeySlot::Record => "record",
            HotkeySlot::Play => "play",
            HotkeySlot::Stop => "stop",
            HotkeySlot::Spam => "spam",
        }
    }
}

/// Display labels for the four slots, as persisted in session files and the
/// application config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotkeyLabels {
    #[serde(default)]
    pub record: String,
    #[serde(default)]
    pub play: String,
    #[serde(default)]
    pub stop: String,
    #[serde(default)]
    pub spam: String,
}

impl Default for HotkeyLabels {
    fn default() -> Self {
        HotkeyBindings::default().labels()
    }
}

/// The current binding of each slot.
#[derive(Debug, Clone, PartialEq)]
pub struct HotkeyBindings {
    record: KeyIdentity,
    play: KeyIdentity,
    stop: KeyIdentity,
    spam: KeyIdentity,
}

impl Default for HotkeyBindings {
    /// F1 record, F2 play, Esc stop, F3 spam.
    fn default() -> Self {
        Self {
            record: KeyIdentity::Special(SpecialKey::F1),
            play: KeyIdentity::Special(SpecialKey::F2),
            stop: KeyIdentity::Special(SpecialKey::Escape),
            spam: KeyIdentity::Special(SpecialKey::F3),
        }
    }
}

impl HotkeyBindings {
    pub fn get(&self, slot: HotkeySlot) -> &KeyIdentity {
        match slot {
            HotkeySlot::Record => &self.record,
            HotkeySlot::Play => &self.play,
            HotkeySlot::Stop => &self.stop,
            HotkeySlot::Spam => &self.spam,
        }
    }

    pub fn set(&mut self, slot: HotkeySlot, key: KeyIdentity) {
        match slot {
            HotkeySlot::Record => self.record = key,
            HotkeySlot::Play => self.play = key,
            HotkeySlot::Stop => self.stop = key,
            HotkeySlot::Spam => self.spam = key,
        }
    }

    /// Matches a pressed key against the bindings; first match in priority
    /// order wins.
    pub fn match_key(&self, key: &KeyIdentity) -> Option<HotkeySlot> {
        HotkeySlot::IN_PRIORITY_ORDER
            .into_iter()
            .find(|slot| self.get(*slot) == key)
    }

    /// The identities the recorder must not capture.
    pub fn suppressed_keys(&self) -> Vec<KeyIdentity> {
        HotkeySlot::IN_PRIORITY_ORDER
            .into_iter()
            .map(|slot| *self.get(slot))
            .collect()
    }

    /// Display labels for persistence.
    pub fn labels(&self) -> HotkeyLabels {
        HotkeyLabels {
            record: self.record.label(),
            play: self.play.label(),
            stop: self.stop.label(),
            spam: self.spam.label(),
        }
    }

    /// Applies persisted labels, re-resolving each through
    /// [`KeyIdentity::parse`].
    ///
    /// An empty or unparsable label keeps the slot's current binding; the
    /// failure is logged rather than silently rebinding to some default.
    pub fn apply_labels(&mut self, labels: &HotkeyLabels) {
        let pairs = [
            (HotkeySlot::Record, labels.record.as_str()),
            (HotkeySlot::Play, labels.play.as_str()),
            (HotkeySlot::Stop, labels.stop.as_str()),
            (HotkeySlot::Spam, labels.spam.as_str()),
        ];
        for (slot, label) in pairs {
            if label.trim().is_empty() {
                continue;
            }
            match KeyIdentity::parse(label) {
                Some(key) => self.set(slot, key),
                None => warn!(slot = slot.as_str(), label, "unparsable hotkey label, keeping current binding"),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
