//! Named non-printable keys.
//!
//! Every variant carries two string forms:
//!
//! - a stable lowercase **name** (`"esc"`, `"page_up"`, `"shift_r"`) used in
//!   recorded sessions, so files stay readable and diffable;
//! - a human **label** (`"ESC"`, `"PG UP"`, `"R-SHIFT"`, arrow glyphs) shown
//!   in the UI and persisted for hotkey bindings.
//!
//! Both forms parse back to the same variant; see [`SpecialKey::parse`].

use serde::{Deserialize, Serialize};

/// A named key that does not produce a printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKey {
    Escape,
    Tab,
    Space,
    Enter,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
    Menu,
    Shift,
    ShiftR,
    Ctrl,
    CtrlR,
    Alt,
    AltR,
    AltGr,
    Cmd,
    CmdR,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// All variants, used by the parsers to scan for a match.
const ALL: &[SpecialKey] = &[
    SpecialKey::Escape,
    SpecialKey::Tab,
    SpecialKey::Space,
    SpecialKey::Enter,
    SpecialKey::Backspace,
    SpecialKey::Delete,
    SpecialKey::Insert,
    SpecialKey::Home,
    SpecialKey::End,
    SpecialKey::PageUp,
    SpecialKey::PageDown,
    SpecialKey::Up,
    SpecialKey::Down,
    SpecialKey::Left,
    SpecialKey::Right,
    SpecialKey::CapsLock,
    SpecialKey::NumLock,
    SpecialKey::ScrollLock,
    SpecialKey::PrintScreen,
    SpecialKey::Pause,
    SpecialKey::Menu,
    SpecialKey::Shift,
    SpecialKey::ShiftR,
    SpecialKey::Ctrl,
    SpecialKey::CtrlR,
    SpecialKey::Alt,
    SpecialKey::AltR,
    SpecialKey::AltGr,
    SpecialKey::Cmd,
    SpecialKey::CmdR,
    SpecialKey::F1,
    SpecialKey::F2,
    SpecialKey::F3,
    SpecialKey::F4,
    SpecialKey::F5,
    SpecialKey::F6,
    SpecialKey::F7,
    SpecialKey::F8,
    SpecialKey::F9,
    SpecialKey::F10,
    SpecialKey::F11,
    SpecialKey::F12,
];

impl SpecialKey {
    /// Stable machine name stored in recorded sessions.
    pub fn name(self) -> &'static str {
        match self {
            SpecialKey::Escape => "esc",
            SpecialKey::Tab => "tab",
            SpecialKey::Space => "space",
            SpecialKey::Enter => "enter",
            SpecialKey::Backspace => "backspace",
            SpecialKey::Delete => "delete",
            SpecialKey::Insert => "insert",
            SpecialKey::Home => "home",
            SpecialKey::End => "end",
            SpecialKey::PageUp => "page_up",
            SpecialKey::PageDown => "page_down",
            SpecialKey::Up => "up",
            SpecialKey::Down => "down",
            SpecialKey::Left => "left",
            SpecialKey::Right => "right",
            SpecialKey::CapsLock => "caps_lock",
            SpecialKey::NumLock => "num_lock",
            SpecialKey::ScrollLock => "scroll_lock",
            SpecialKey::PrintScreen => "print_screen",
            SpecialKey::Pause => "pause",
            SpecialKey::Menu => "menu",
            SpecialKey::Shift => "shift",
            SpecialKey::ShiftR => "shift_r",
            SpecialKey::Ctrl => "ctrl",
            SpecialKey::CtrlR => "ctrl_r",
            SpecialKey::Alt => "alt",
            SpecialKey::AltR => "alt_r",
            SpecialKey::AltGr => "alt_gr",
            SpecialKey::Cmd => "cmd",
            SpecialKey::CmdR => "cmd_r",
            SpecialKey::F1 => "f1",
            SpecialKey::F2 => "f2",
            SpecialKey::F3 => "f3",
            SpecialKey::F4 => "f4",
            SpecialKey::F5 => "f5",
            SpecialKey::F6 => "f6",
            SpecialKey::F7 => "f7",
            SpecialKey::F8 => "f8",
            SpecialKey::F9 => "f9",
            SpecialKey::F10 => "f10",
            SpecialKey::F11 => "f11",
            SpecialKey::F12 => "f12",
        }
    }

    /// Display label: the uppercased name with a handful of cosmetic remaps
    /// (arrows become glyphs, long names get the short form used on keycaps).
    pub fn label(self) -> &'static str {
        match self {
            SpecialKey::Escape => "ESC",
            SpecialKey::Tab => "TAB",
            SpecialKey::Space => "SPACE",
            SpecialKey::Enter => "ENTER",
            SpecialKey::Backspace => "BACKSPACE",
            SpecialKey::Delete => "DEL",
            SpecialKey::Insert => "INS",
            SpecialKey::Home => "HOME",
            SpecialKey::End => "END",
            SpecialKey::PageUp => "PG UP",
            SpecialKey::PageDown => "PG DN",
            SpecialKey::Up => "↑",
            SpecialKey::Down => "↓",
            SpecialKey::Left => "←",
            SpecialKey::Right => "→",
            SpecialKey::CapsLock => "CAPS",
            SpecialKey::NumLock => "NUM_LOCK",
            SpecialKey::ScrollLock => "SCROLL_LOCK",
            SpecialKey::PrintScreen => "PRINT_SCREEN",
            SpecialKey::Pause => "PAUSE",
            SpecialKey::Menu => "MENU",
            SpecialKey::Shift => "SHIFT",
            SpecialKey::ShiftR => "R-SHIFT",
            SpecialKey::Ctrl => "CTRL",
            SpecialKey::CtrlR => "R-CTRL",
            SpecialKey::Alt => "ALT",
            SpecialKey::AltR => "R-ALT",
            SpecialKey::AltGr => "ALT GR",
            SpecialKey::Cmd => "CMD",
            SpecialKey::CmdR => "R-CMD",
            SpecialKey::F1 => "F1",
            SpecialKey::F2 => "F2",
            SpecialKey::F3 => "F3",
            SpecialKey::F4 => "F4",
            SpecialKey::F5 => "F5",
            SpecialKey::F6 => "F6",
            SpecialKey::F7 => "F7",
            SpecialKey::F8 => "F8",
            SpecialKey::F9 => "F9",
            SpecialKey::F10 => "F10",
            SpecialKey::F11 => "F11",
            SpecialKey::F12 => "F12",
        }
    }

    /// Parses either string form back to a variant.
    ///
    /// Matching is case-insensitive against the stable name and exact against
    /// the display label (labels may contain glyphs and spaces). Returns
    /// `None` for anything that is not a named key.
    pub fn parse(text: &str) -> Option<SpecialKey> {
        let lowered = text.to_lowercase();
        ALL.iter()
            .copied()
            .find(|key| key.name() == lowered || key.label() == text || key.label().to_lowercase() == lowered)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
