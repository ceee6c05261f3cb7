//! `enigo`-based injection backend (feature `os-input`).
//!
//! Keypad digits and operators are injected as their character equivalents
//! and keypad Enter as Return: synthesis APIs type characters, they do not
//! address physical keypad positions. Raw keysym identities have no
//! injectable mapping and surface as [`InjectionError::UnmappedKey`], which
//! the player logs and skips.

use std::sync::Mutex;

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use macroclick_core::{KeyIdentity, MouseButton, SpecialKey};

use super::{InjectionError, InputInjector};

/// An [`InputInjector`] backed by enigo.
pub struct EnigoInjector {
    // enigo's calls take &mut self; the injector trait is &self.
    enigo: Mutex<Enigo>,
}

impl EnigoInjector {
    /// Connects to the platform input synthesis API.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Platform`] when the connection fails
    /// (e.g. no display server).
    pub fn new() -> Result<Self, InjectionError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| InjectionError::Platform(e.to_string()))?;
        Ok(Self { enigo: Mutex::new(enigo) })
    }
}

impl InputInjector for EnigoInjector {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), InjectionError> {
        self.enigo
            .lock()
            .expect("lock poisoned")
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| InjectionError::Platform(e.to_string()))
    }

    fn button_down(&self, button: MouseButton) -> Result<(), InjectionError> {
        self.enigo
            .lock()
            .expect("lock poisoned")
            .button(to_enigo_button(button), Direction::Press)
            .map_err(|e| InjectionError::Platform(e.to_string()))
    }

    fn button_up(&self, button: MouseButton) -> Result<(), InjectionError> {
        self.enigo
            .lock()
            .expect("lock poisoned")
            .button(to_enigo_button(button), Direction::Release)
            .map_err(|e| InjectionError::Platform(e.to_string()))
    }

    fn click(&self, button: MouseButton) -> Result<(), InjectionError> {
        self.enigo
            .lock()
            .expect("lock poisoned")
            .button(to_enigo_button(button), Direction::Click)
            .map_err(|e| InjectionError::Platform(e.to_string()))
    }

    fn key_down(&self, key: &KeyIdentity) -> Result<(), InjectionError> {
        let key = to_enigo_key(key)?;
        self.enigo
            .lock()
            .expect("lock poisoned")
            .key(key, Direction::Press)
            .map_err(|e| InjectionError::Platform(e.to_string()))
    }

    fn key_up(&self, key: &KeyIdentity) -> Result<(), InjectionError> {
        let key = to_enigo_key(key)?;
        self.enigo
            .lock()
            .expect("lock poisoned")
            .key(key, Direction::Release)
            .map_err(|e| InjectionError::Platform(e.to_string()))
    }
}

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

fn to_enigo_key(key: &KeyIdentity) -> Result<enigo::Key, InjectionError> {
    use enigo::Key;
    match key {
        KeyIdentity::Char(ch) => Ok(Key::Unicode(*ch)),
        KeyIdentity::Numpad(numpad) => match numpad.char_equivalent() {
            Some(ch) => Ok(Key::Unicode(ch)),
            // Keypad Enter replays as Return; see module docs.
            None => Ok(Key::Return),
        },
        KeyIdentity::Raw(code) => Err(InjectionError::UnmappedKey(format!("key_{code}"))),
        KeyIdentity::Special(special) => match special {
            SpecialKey::Escape => Ok(Key::Escape),
            SpecialKey::Tab => Ok(Key::Tab),
            SpecialKey::Space => Ok(Key::Space),
            SpecialKey::Enter => Ok(Key::Return),
            SpecialKey::Backspace => Ok(Key::Backspace),
            SpecialKey::Delete => Ok(Key::Delete),
            SpecialKey::Home => Ok(Key::Home),
            SpecialKey::End => Ok(Key::End),
            SpecialKey::PageUp => Ok(Key::PageUp),
            SpecialKey::PageDown => Ok(Key::PageDown),
            SpecialKey::Up => Ok(Key::UpArrow),
            SpecialKey::Down => Ok(Key::DownArrow),
            SpecialKey::Left => Ok(Key::LeftArrow),
            SpecialKey::Right => Ok(Key::RightArrow),
            SpecialKey::CapsLock => Ok(Key::CapsLock),
            SpecialKey::Shift | SpecialKey::ShiftR => Ok(Key::Shift),
            SpecialKey::Ctrl | SpecialKey::CtrlR => Ok(Key::Control),
            SpecialKey::Alt | SpecialKey::AltR | SpecialKey::AltGr => Ok(Key::Alt),
            SpecialKey::Cmd | SpecialKey::CmdR => Ok(Key::Meta),
            SpecialKey::F1 => Ok(Key::F1),
            SpecialKey::F2 => Ok(Key::F2),
            SpecialKey::F3 => Ok(Key::F3),
            SpecialKey::F4 => Ok(Key::F4),
            SpecialKey::F5 => Ok(Key::F5),
            SpecialKey::F6 => Ok(Key::F6),
            SpecialKey::F7 => Ok(Key::F7),
            SpecialKey::F8 => Ok(Key::F8),
            SpecialKey::F9 => Ok(Key::F9),
            SpecialKey::F10 => Ok(Key::F10),
            SpecialKey::F11 => Ok(Key::F11),
            SpecialKey::F12 => Ok(Key::F12),
            SpecialKey::Insert
            | SpecialKey::NumLock
            | SpecialKey::ScrollLock
            | SpecialKey::PrintScreen
            | SpecialKey::Pause
            | SpecialKey::Menu => {
                Err(InjectionError::UnmappedKey(special.name().to_string()))
            }
        },
    }
}
