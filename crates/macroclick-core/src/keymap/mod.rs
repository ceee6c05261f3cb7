//! Key-identity resolution.
//!
//! Raw key observations arrive from the capture backends in four shapes
//! (named key, explicit keypad key, printable character with an optional
//! platform code, opaque keysym). [`KeyIdentity::resolve`] normalizes every
//! shape into one canonical, hashable identity plus a display label, so the
//! recorder, the player and the hotkey matcher all compare the same value
//! regardless of where a key observation came from: live capture, a replay
//! file or a persisted hotkey label.
//!
//! Two normalization rules carry the behaviour users actually notice:
//!
//! - **Keypad folding.** A keypad digit is the same identity whether the
//!   platform reported a `KP_*` keysym (either NumLock state) or a printable
//!   character without a standard code. The main-row digit stays a distinct
//!   identity.
//! - **Case folding.** Printable characters fold to lowercase, so a hotkey
//!   captured while Shift or CapsLock was held matches the plain press of
//!   the same key.
//!
//! # Known limitation
//!
//! Keypad Enter is only distinguishable from main Enter when the platform
//! reports the `KP_Enter` keysym. A backend that only reports a named Enter
//! gives no signal, and both keys resolve to `Special(Enter)`. This is a
//! platform gap, not something this module papers over.

pub mod numpad;
pub mod special;

pub use numpad::NumpadKey;
pub use special::SpecialKey;

/// A raw key observation as produced by a capture backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawKey {
    /// A recognized named key.
    Special(SpecialKey),
    /// A key the platform already attributes to the numeric keypad.
    Keypad(NumpadKey),
    /// A printable character. `code` is the platform's standard key code;
    /// its absence is the keypad signal on X11 with NumLock on.
    Char { ch: char, code: Option<u32> },
    /// An opaque platform keysym with no higher-level interpretation.
    Keysym(u32),
}

/// Canonical, case/shift-insensitive identity of a physical key.
///
/// Equality and hashing use only the variant data; display labels are
/// derived on demand and never part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIdentity {
    /// A named non-printable key.
    Special(SpecialKey),
    /// A main-keyboard printable character, folded to lowercase.
    Char(char),
    /// A numeric-keypad key.
    Numpad(NumpadKey),
    /// An unrecognized raw keysym.
    Raw(u32),
}

impl KeyIdentity {
    /// Resolves a raw observation to its canonical identity.
    pub fn resolve(raw: RawKey) -> KeyIdentity {
        match raw {
            RawKey::Special(key) => KeyIdentity::Special(key),
            RawKey::Keypad(key) => KeyIdentity::Numpad(key),
            RawKey::Keysym(keysym) => match NumpadKey::from_keysym(keysym) {
                Some(key) => KeyIdentity::Numpad(key),
                None => KeyIdentity::Raw(keysym),
            },
            RawKey::Char { ch, code } => {
                // No standard code on a digit/operator means the keypad
                // produced it (X11, NumLock on).
                if code.is_none() {
                    if let Some(key) = NumpadKey::from_char(ch) {
                        return KeyIdentity::Numpad(key);
                    }
                }
                KeyIdentity::Char(fold_char(ch))
            }
        }
    }

    /// Stable machine name, used as the key string in recorded sessions.
    pub fn name(&self) -> String {
        match self {
            KeyIdentity::Special(key) => key.name().to_string(),
            KeyIdentity::Char(ch) => ch.to_string(),
            KeyIdentity::Numpad(key) => key.name().to_string(),
            KeyIdentity::Raw(code) => format!("key_{code}"),
        }
    }

    /// Human display label, used in the UI and in persisted hotkey bindings.
    pub fn label(&self) -> String {
        match self {
            KeyIdentity::Special(key) => key.label().to_string(),
            KeyIdentity::Char(ch) => ch.to_uppercase().to_string(),
            KeyIdentity::Numpad(key) => key.label().to_string(),
            KeyIdentity::Raw(code) => format!("KEY {code}"),
        }
    }

    /// Parses a stored name or display label back to an identity.
    ///
    /// Accepts everything [`name`](Self::name) and [`label`](Self::label)
    /// produce, plus the legacy `Key.<name>` form older session files
    /// contain. Surrounding quote characters a legacy writer may have left
    /// in persisted labels are stripped. Returns `None` for text that does
    /// not denote any key.
    pub fn parse(text: &str) -> Option<KeyIdentity> {
        let cleaned = text.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        if cleaned.is_empty() {
            return None;
        }

        // Legacy session files spell special keys as e.g. "Key.f1".
        if let Some(rest) = cleaned.strip_prefix("Key.") {
            return SpecialKey::parse(rest).map(KeyIdentity::Special);
        }

        if let Some(key) = NumpadKey::parse(cleaned) {
            return Some(KeyIdentity::Numpad(key));
        }

        if let Some(code) = parse_raw_code(cleaned) {
            return Some(KeyIdentity::Raw(code));
        }

        // Specials before the single-char fallback: arrow labels are single
        // glyphs and must stay arrows.
        if let Some(key) = SpecialKey::parse(cleaned) {
            return Some(KeyIdentity::Special(key));
        }

        let mut chars = cleaned.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(KeyIdentity::Char(fold_char(ch))),
            _ => None,
        }
    }
}

/// Folds a character to its lowercase form, keeping it a single char.
fn fold_char(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Parses the `key_<code>` / `KEY <code>` forms used for unrecognized keys.
fn parse_raw_code(text: &str) -> Option<u32> {
    let lowered = text.to_lowercase();
    let digits = lowered
        .strip_prefix("key_")
        .or_else(|| lowered.strip_prefix("key "))?;
    digits.parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
