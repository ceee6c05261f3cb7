//! Mock input source for unit and integration testing.
//!
//! Allows tests to inject synthetic [`CapturedEvent`]s without any OS
//! hooks running.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use macroclick_core::{MouseButton, RawKey};

use super::{CaptureError, CapturedEvent, InputSource};

/// A mock implementation of [`InputSource`] that lets tests inject events.
#[derive(Default)]
pub struct MockInputSource {
    sender: Arc<Mutex<Option<Sender<CapturedEvent>>>>,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or `stop()` already has.
    pub fn inject_event(&self, event: CapturedEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(sender) => sender
                .send(event)
                .expect("receiver has been dropped; call start() first"),
            None => panic!("MockInputSource::inject_event called before start()"),
        }
    }

    /// Injects a key press followed by its release.
    pub fn inject_key_tap(&self, key: RawKey) {
        self.inject_event(CapturedEvent::Key { key, pressed: true });
        self.inject_event(CapturedEvent::Key { key, pressed: false });
    }

    /// Injects a key press only.
    pub fn inject_key_press(&self, key: RawKey) {
        self.inject_event(CapturedEvent::Key { key, pressed: true });
    }

    /// Injects a full click (press + release) at a position.
    pub fn inject_click(&self, x: i32, y: i32, button: MouseButton) {
        self.inject_event(CapturedEvent::MouseButton { x, y, button, pressed: true });
        self.inject_event(CapturedEvent::MouseButton { x, y, button, pressed: false });
    }

    /// `true` while a receiver from `start()` is live.
    pub fn is_started(&self) -> bool {
        self.sender.lock().expect("lock poisoned").is_some()
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<CapturedEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use macroclick_core::SpecialKey;

    #[test]
    fn test_mock_source_starts_and_receives_events() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.inject_event(CapturedEvent::Key {
            key: RawKey::Special(SpecialKey::F1),
            pressed: true,
        });

        // Assert
        let event = rx.recv().expect("should receive event");
        assert!(matches!(event, CapturedEvent::Key { pressed: true, .. }));
    }

    #[test]
    fn test_mock_source_stop_closes_channel() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.stop();

        // Assert – channel should be disconnected
        assert!(rx.recv().is_err(), "channel should be closed after stop()");
    }

    #[test]
    fn test_inject_click_produces_press_then_release() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.inject_click(100, 200, MouseButton::Left);

        // Assert
        assert!(matches!(
            rx.recv().unwrap(),
            CapturedEvent::MouseButton { x: 100, y: 200, pressed: true, .. }
        ));
        assert!(matches!(
            rx.recv().unwrap(),
            CapturedEvent::MouseButton { pressed: false, .. }
        ));
    }
}
