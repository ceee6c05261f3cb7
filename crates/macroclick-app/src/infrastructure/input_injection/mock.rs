//! Mock injector for unit and integration testing.
//!
//! Records every call with a timestamp so tests can assert on ordering and
//! timing, and can be told to fail button or key operations to exercise the
//! error paths.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use std::time::Instant;

use macroclick_core::{KeyIdentity, MouseButton};

use super::{InjectionError, InputInjector};

/// One recorded injector call.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectorCall {
    MovePointer { x: i32, y: i32 },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    Click(MouseButton),
    KeyDown(KeyIdentity),
    KeyUp(KeyIdentity),
}

/// A mock implementation of [`InputInjector`] that records calls.
pub struct MockInjector {
    calls: Mutex<Vec<(InjectorCall, Instant)>>,
    fail_buttons: AtomicBool,
    fail_keys: AtomicBool,
}

impl Default for MockInjector {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_buttons: AtomicBool::new(false),
            fail_keys: AtomicBool::new(false),
        }
    }
}

impl MockInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<InjectorCall> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// All calls with the instant they were made.
    pub fn timed_calls(&self) -> Vec<(InjectorCall, Instant)> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Buttons and keys currently held down according to the call log
    /// (downs without a matching up).
    pub fn held_inputs(&self) -> (Vec<MouseButton>, Vec<KeyIdentity>) {
        let mut buttons = Vec::new();
        let mut keys = Vec::new();
        for (call, _) in self.calls.lock().expect("lock poisoned").iter() {
            match call {
                InjectorCall::ButtonDown(b) => buttons.push(*b),
                InjectorCall::ButtonUp(b) => {
                    if let Some(pos) = buttons.iter().position(|held| held == b) {
                        buttons.remove(pos);
                    }
                }
                InjectorCall::KeyDown(k) => keys.push(*k),
                InjectorCall::KeyUp(k) => {
                    if let Some(pos) = keys.iter().position(|held| held == k) {
                        keys.remove(pos);
                    }
                }
                InjectorCall::MovePointer { .. } | InjectorCall::Click(_) => {}
            }
        }
        (buttons, keys)
    }

    /// Number of releases issued for a specific key.
    pub fn key_up_count(&self, key: &KeyIdentity) -> usize {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|(call, _)| matches!(call, InjectorCall::KeyUp(k) if k == key))
            .count()
    }

    /// Number of atomic clicks issued.
    pub fn click_count(&self) -> usize {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|(call, _)| matches!(call, InjectorCall::Click(_)))
            .count()
    }

    /// Makes subsequent button operations fail.
    pub fn set_fail_buttons(&self, fail: bool) {
        self.fail_buttons.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent key operations fail.
    pub fn set_fail_keys(&self, fail: bool) {
        self.fail_keys.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: InjectorCall) {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push((call, Instant::now()));
    }
}

impl InputInjector for MockInjector {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), InjectionError> {
        self.record(InjectorCall::MovePointer { x, y });
        Ok(())
    }

    fn button_down(&self, button: MouseButton) -> Result<(), InjectionError> {
        if self.fail_buttons.load(Ordering::SeqCst) {
            return Err(InjectionError::Platform("injected failure".to_string()));
        }
        self.record(InjectorCall::ButtonDown(button));
        Ok(())
    }

    fn button_up(&self, button: MouseButton) -> Result<(), InjectionError> {
        if self.fail_buttons.load(Ordering::SeqCst) {
            return Err(InjectionError::Platform("injected failure".to_string()));
        }
        self.record(InjectorCall::ButtonUp(button));
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), InjectionError> {
        if self.fail_buttons.load(Ordering::SeqCst) {
            return Err(InjectionError::Platform("injected failure".to_string()));
        }
        self.record(InjectorCall::Click(button));
        Ok(())
    }

    fn key_down(&self, key: &KeyIdentity) -> Result<(), InjectionError> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(InjectionError::Platform("injected failure".to_string()));
        }
        self.record(InjectorCall::KeyDown(*key));
        Ok(())
    }

    fn key_up(&self, key: &KeyIdentity) -> Result<(), InjectionError> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(InjectionError::Platform("injected failure".to_string()));
        }
        self.record(InjectorCall::KeyUp(*key));
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_injector_records_calls_in_order() {
        // Arrange
        let injector = MockInjector::new();

        // Act
        injector.move_pointer(10, 20).unwrap();
        injector.button_down(MouseButton::Left).unwrap();
        injector.button_up(MouseButton::Left).unwrap();

        // Assert
        assert_eq!(
            injector.calls(),
            vec![
                InjectorCall::MovePointer { x: 10, y: 20 },
                InjectorCall::ButtonDown(MouseButton::Left),
                InjectorCall::ButtonUp(MouseButton::Left),
            ]
        );
    }

    #[test]
    fn test_held_inputs_tracks_unbalanced_downs() {
        // Arrange
        let injector = MockInjector::new();
        let key = KeyIdentity::Char('a');

        // Act – press without release
        injector.key_down(&key).unwrap();
        injector.button_down(MouseButton::Right).unwrap();

        // Assert
        let (buttons, keys) = injector.held_inputs();
        assert_eq!(buttons, vec![MouseButton::Right]);
        assert_eq!(keys, vec![key]);
    }

    #[test]
    fn test_failure_injection_on_keys() {
        // Arrange
        let injector = MockInjector::new();
        injector.set_fail_keys(true);

        // Act / Assert
        assert!(injector.key_down(&KeyIdentity::Char('a')).is_err());
        // Button ops are unaffected
        assert!(injector.click(MouseButton::Left).is_ok());
    }
}
