//! `rdev`-based capture backend (feature `os-input`).
//!
//! `rdev::listen` may only run once per process, so a single listener
//! thread fans events out to every subscribed [`RdevInputSource`]. Sources
//! subscribe on `start()` and unsubscribe on `stop()`; the listener thread
//! itself stays up for the lifetime of the process, which is an `rdev`
//! constraint rather than a choice.
//!
//! `rdev` reports button events without coordinates, so the hub tracks the
//! last observed pointer position and stamps button events with it.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc::{self, Sender},
    Mutex, OnceLock,
};

use tracing::{error, warn};

use macroclick_core::{MouseButton, NumpadKey, RawKey, SpecialKey};

use super::{CaptureError, CapturedEvent, InputSource};

/// Fan-out hub in front of the process-wide rdev listener.
struct ListenerHub {
    subscribers: Mutex<Vec<(u64, Sender<CapturedEvent>)>>,
    last_position: Mutex<(i32, i32)>,
}

impl ListenerHub {
    fn subscribe(&self, id: u64, sender: Sender<CapturedEvent>) {
        self.subscribers
            .lock()
            .expect("lock poisoned")
            .push((id, sender));
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers
            .lock()
            .expect("lock poisoned")
            .retain(|(sub_id, _)| *sub_id != id);
    }

    fn dispatch(&self, event: rdev::Event) {
        let captured = match event.event_type {
            rdev::EventType::MouseMove { x, y } => {
                *self.last_position.lock().expect("lock poisoned") = (x as i32, y as i32);
                return;
            }
            rdev::EventType::ButtonPress(button) => {
                let Some(button) = translate_button(button) else { return };
                let (x, y) = *self.last_position.lock().expect("lock poisoned");
                CapturedEvent::MouseButton { x, y, button, pressed: true }
            }
            rdev::EventType::ButtonRelease(button) => {
                let Some(button) = translate_button(button) else { return };
                let (x, y) = *self.last_position.lock().expect("lock poisoned");
                CapturedEvent::MouseButton { x, y, button, pressed: false }
            }
            rdev::EventType::KeyPress(key) => CapturedEvent::Key {
                key: translate_key(key, event.name.as_deref()),
                pressed: true,
            },
            rdev::EventType::KeyRelease(key) => CapturedEvent::Key {
                key: translate_key(key, event.name.as_deref()),
                pressed: false,
            },
            rdev::EventType::Wheel { .. } => return,
        };

        // Drop subscribers whose receiver is gone.
        self.subscribers
            .lock()
            .expect("lock poisoned")
            .retain(|(_, sender)| sender.send(captured).is_ok());
    }
}

/// Returns the hub, spawning the single rdev listener thread on first use.
fn hub() -> &'static ListenerHub {
    static HUB: OnceLock<ListenerHub> = OnceLock::new();
    HUB.get_or_init(|| {
        std::thread::spawn(|| {
            if let Err(e) = rdev::listen(|event| hub().dispatch(event)) {
                error!(error = ?e, "rdev listener terminated");
            }
        });
        ListenerHub {
            subscribers: Mutex::new(Vec::new()),
            last_position: Mutex::new((0, 0)),
        }
    })
}

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(0);

/// An [`InputSource`] backed by the shared rdev listener.
pub struct RdevInputSource {
    id: u64,
    sender: Mutex<Option<Sender<CapturedEvent>>>,
}

impl RdevInputSource {
    pub fn new() -> Self {
        Self {
            id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
            sender: Mutex::new(None),
        }
    }
}

impl Default for RdevInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for RdevInputSource {
    fn start(&self) -> Result<mpsc::Receiver<CapturedEvent>, CaptureError> {
        let mut guard = self.sender.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel();
        hub().subscribe(self.id, tx.clone());
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        hub().unsubscribe(self.id);
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

impl Drop for RdevInputSource {
    fn drop(&mut self) {
        hub().unsubscribe(self.id);
    }
}

// ── Translation tables ────────────────────────────────────────────────────────

fn translate_button(button: rdev::Button) -> Option<MouseButton> {
    match button {
        rdev::Button::Left => Some(MouseButton::Left),
        rdev::Button::Right => Some(MouseButton::Right),
        rdev::Button::Middle => Some(MouseButton::Middle),
        rdev::Button::Unknown(code) => {
            warn!(code, "ignoring unknown mouse button");
            None
        }
    }
}

/// Translates an rdev key to the resolver's raw observation.
///
/// Printable keys prefer the event's layout-aware name; the QWERTY position
/// is the fallback when the platform gives none.
fn translate_key(key: rdev::Key, name: Option<&str>) -> RawKey {
    if let Some(special) = named_key(key) {
        return RawKey::Special(special);
    }
    if let Some(keypad) = keypad_key(key) {
        return RawKey::Keypad(keypad);
    }
    if let rdev::Key::Unknown(code) = key {
        return RawKey::Keysym(code);
    }

    if let Some(ch) = name.and_then(single_char) {
        return RawKey::Char { ch, code: Some(ch as u32) };
    }
    match qwerty_char(key) {
        Some(ch) => RawKey::Char { ch, code: Some(ch as u32) },
        None => RawKey::Keysym(0),
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_control() => Some(ch),
        _ => None,
    }
}

fn named_key(key: rdev::Key) -> Option<SpecialKey> {
    use rdev::Key as K;
    match key {
        K::Escape => Some(SpecialKey::Escape),
        K::Tab => Some(SpecialKey::Tab),
        K::Space => Some(SpecialKey::Space),
        K::Return => Some(SpecialKey::Enter),
        K::Backspace => Some(SpecialKey::Backspace),
        K::Delete => Some(SpecialKey::Delete),
        K::Insert => Some(SpecialKey::Insert),
        K::Home => Some(SpecialKey::Home),
        K::End => Some(SpecialKey::End),
        K::PageUp => Some(SpecialKey::PageUp),
        K::PageDown => Some(SpecialKey::PageDown),
        K::UpArrow => Some(SpecialKey::Up),
        K::DownArrow => Some(SpecialKey::Down),
        K::LeftArrow => Some(SpecialKey::Left),
        K::RightArrow => Some(SpecialKey::Right),
        K::CapsLock => Some(SpecialKey::CapsLock),
        K::NumLock => Some(SpecialKey::NumLock),
        K::ScrollLock => Some(SpecialKey::ScrollLock),
        K::PrintScreen => Some(SpecialKey::PrintScreen),
        K::Pause => Some(SpecialKey::Pause),
        K::ShiftLeft => Some(SpecialKey::Shift),
        K::ShiftRight => Some(SpecialKey::ShiftR),
        K::ControlLeft => Some(SpecialKey::Ctrl),
        K::ControlRight => Some(SpecialKey::CtrlR),
        K::Alt => Some(SpecialKey::Alt),
        K::AltGr => Some(SpecialKey::AltGr),
        K::MetaLeft => Some(SpecialKey::Cmd),
        K::MetaRight => Some(SpecialKey::CmdR),
        K::F1 => Some(SpecialKey::F1),
        K::F2 => Some(SpecialKey::F2),
        K::F3 => Some(SpecialKey::F3),
        K::F4 => Some(SpecialKey::F4),
        K::F5 => Some(SpecialKey::F5),
        K::F6 => Some(SpecialKey::F6),
        K::F7 => Some(SpecialKey::F7),
        K::F8 => Some(SpecialKey::F8),
        K::F9 => Some(SpecialKey::F9),
        K::F10 => Some(SpecialKey::F10),
        K::F11 => Some(SpecialKey::F11),
        K::F12 => Some(SpecialKey::F12),
        _ => None,
    }
}

fn keypad_key(key: rdev::Key) -> Option<NumpadKey> {
    use rdev::Key as K;
    match key {
        K::Kp0 => Some(NumpadKey::Num0),
        K::Kp1 => Some(NumpadKey::Num1),
        K::Kp2 => Some(NumpadKey::Num2),
        K::Kp3 => Some(NumpadKey::Num3),
        K::Kp4 => Some(NumpadKey::Num4),
        K::Kp5 => Some(NumpadKey::Num5),
        K::Kp6 => Some(NumpadKey::Num6),
        K::Kp7 => Some(NumpadKey::Num7),
        K::Kp8 => Some(NumpadKey::Num8),
        K::Kp9 => Some(NumpadKey::Num9),
        K::KpDelete => Some(NumpadKey::Decimal),
        K::KpPlus => Some(NumpadKey::Add),
        K::KpMinus => Some(NumpadKey::Subtract),
        K::KpMultiply => Some(NumpadKey::Multiply),
        K::KpDivide => Some(NumpadKey::Divide),
        K::KpReturn => Some(NumpadKey::Enter),
        _ => None,
    }
}

fn qwerty_char(key: rdev::Key) -> Option<char> {
    use rdev::Key as K;
    match key {
        K::KeyA => Some('a'),
        K::KeyB => Some('b'),
        K::KeyC => Some('c'),
        K::KeyD => Some('d'),
        K::KeyE => Some('e'),
        K::KeyF => Some('f'),
        K::KeyG => Some('g'),
        K::KeyH => Some('h'),
        K::KeyI => Some('i'),
        K::KeyJ => Some('j'),
        K::KeyK => Some('k'),
        K::KeyL => Some('l'),
        K::KeyM => Some('m'),
        K::KeyN => Some('n'),
        K::KeyO => Some('o'),
        K::KeyP => Some('p'),
        K::KeyQ => Some('q'),
        K::KeyR => Some('r'),
        K::KeyS => Some('s'),
        K::KeyT => Some('t'),
        K::KeyU => Some('u'),
        K::KeyV => Some('v'),
        K::KeyW => Some('w'),
        K::KeyX => Some('x'),
        K::KeyY => Some('y'),
        K::KeyZ => Some('z'),
        K::Num0 => Some('0'),
        K::Num1 => Some('1'),
        K::Num2 => Some('2'),
        K::Num3 => Some('3'),
        K::Num4 => Some('4'),
        K::Num5 => Some('5'),
        K::Num6 => Some('6'),
        K::Num7 => Some('7'),
        K::Num8 => Some('8'),
        K::Num9 => Some('9'),
        K::Minus => Some('-'),
        K::Equal => Some('='),
        K::LeftBracket => Some('['),
        K::RightBracket => Some(']'),
        K::SemiColon => Some(';'),
        K::Quote => Some('\''),
        K::BackSlash => Some('\\'),
        K::Comma => Some(','),
        K::Dot => Some('.'),
        K::Slash => Some('/'),
        K::BackQuote => Some('`'),
        _ => None,
    }
}
