//! Recorder: captures a time-ordered event sequence.
//!
//! `start()` clears the session, marks the session start on a monotonic
//! clock and drains the capture feed on a dedicated thread; timestamps are
//! elapsed seconds since that mark. Mouse transitions are always recorded.
//! Key transitions resolve to a [`KeyIdentity`] first and are discarded when
//! they match a configured hotkey, so trigger keys never leak into a
//! recording.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread::JoinHandle;
use std::time::Instant;

use tracing::{debug, info};

use macroclick_core::{KeyIdentity, RecordedEvent, Session};

use crate::application::notifications::{InputKind, Notification, Notifier, StatusLevel};
use crate::infrastructure::input_capture::{CapturedEvent, InputSource};

/// Records mouse and keyboard events into the shared session.
pub struct Recorder {
    source: Arc<dyn InputSource>,
    session: Arc<Mutex<Session>>,
    suppressed: Arc<Mutex<Vec<KeyIdentity>>>,
    notifier: Notifier,
    recording: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Recorder {
    pub fn new(
        source: Arc<dyn InputSource>,
        session: Arc<Mutex<Session>>,
        notifier: Notifier,
    ) -> Self {
        Self {
            source,
            session,
            suppressed: Arc::new(Mutex::new(Vec::new())),
            notifier,
            recording: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Sets the key identities to discard while recording (the current
    /// hotkey bindings).
    pub fn set_suppressed_keys(&self, keys: Vec<KeyIdentity>) {
        *self.suppressed.lock().expect("lock poisoned") = keys;
    }

    /// Starts recording. Fails without any state change when already
    /// recording or when the capture feed cannot be started.
    pub fn start(&self) -> bool {
        if self
            .recording
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let rx = match self.source.start() {
            Ok(rx) => rx,
            Err(e) => {
                self.recording.store(false, Ordering::SeqCst);
                self.notifier
                    .status(format!("Failed to start recording: {e}"), StatusLevel::Error);
                return false;
            }
        };

        self.session.lock().expect("lock poisoned").clear();
        let started_at = Instant::now();

        let recording = Arc::clone(&self.recording);
        let session = Arc::clone(&self.session);
        let suppressed = Arc::clone(&self.suppressed);
        let notifier = self.notifier.clone();
        let handle = std::thread::spawn(move || {
            while let Ok(event) = rx.recv() {
                if !recording.load(Ordering::SeqCst) {
                    break;
                }
                let elapsed = started_at.elapsed().as_secs_f64();
                handle_captured(&session, &suppressed, &notifier, event, elapsed);
            }
            debug!("recorder drain thread exiting");
        });
        *self.worker.lock().expect("lock poisoned") = Some(handle);

        info!("recording started");
        self.notifier
            .status("Recording... Click and type!", StatusLevel::Info);
        true
    }

    /// Stops recording and returns the number of captured events.
    ///
    /// Idempotent: calling while idle is a no-op that still reports the
    /// current count.
    pub fn stop(&self) -> usize {
        let was_recording = self.recording.swap(false, Ordering::SeqCst);
        if was_recording {
            self.source.stop();
            if let Some(handle) = self.worker.lock().expect("lock poisoned").take() {
                let _ = handle.join();
            }
            let count = self.session.lock().expect("lock poisoned").len();
            info!(events = count, "recording stopped");
            self.notifier.status(
                format!("Recording stopped. {count} events recorded."),
                StatusLevel::Success,
            );
            return count;
        }
        self.session.lock().expect("lock poisoned").len()
    }

    /// Clears the recorded session.
    pub fn clear(&self) {
        self.session.lock().expect("lock poisoned").clear();
        self.notifier.status("Recording cleared!", StatusLevel::Success);
    }

    pub fn event_count(&self) -> usize {
        self.session.lock().expect("lock poisoned").len()
    }
}

/// Translates one captured event and appends it to the session.
fn handle_captured(
    session: &Mutex<Session>,
    suppressed: &Mutex<Vec<KeyIdentity>>,
    notifier: &Notifier,
    event: CapturedEvent,
    elapsed: f64,
) {
    match event {
        CapturedEvent::MouseButton { x, y, button, pressed } => {
            let recorded = RecordedEvent::Mouse {
                x,
                y,
                button: button.as_str().to_string(),
                pressed,
                timestamp: elapsed,
            };
            let line = recorded.log_line();
            session.lock().expect("lock poisoned").push(recorded);
            notifier.send(Notification::EventLogged { line });
            if pressed {
                notifier.send(Notification::LiveInput {
                    kind: InputKind::Mouse,
                    text: format!("{} ({x}, {y})", button.as_str().to_uppercase()),
                });
            }
        }
        CapturedEvent::Key { key, pressed } => {
            let identity = KeyIdentity::resolve(key);
            if suppressed.lock().expect("lock poisoned").contains(&identity) {
                debug!(key = %identity.label(), "hotkey press not recorded");
                return;
            }
            let name = identity.name();
            let recorded = if pressed {
                RecordedEvent::KeyPress { key: name, timestamp: elapsed }
            } else {
                RecordedEvent::KeyRelease { key: name, timestamp: elapsed }
            };
            let line = recorded.log_line();
            session.lock().expect("lock poisoned").push(recorded);
            notifier.send(Notification::EventLogged { line });
            if pressed {
                notifier.send(Notification::LiveInput {
                    kind: InputKind::Key,
                    text: identity.label(),
                });
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use macroclick_core::{MouseButton, RawKey, SpecialKey};

    use crate::infrastructure::input_capture::mock::MockInputSource;

    fn make_recorder() -> (Recorder, Arc<MockInputSource>, Arc<Mutex<Session>>) {
        let source = Arc::new(MockInputSource::new());
        let session = Arc::new(Mutex::new(Session::new()));
        let (notifier, _rx) = Notifier::channel();
        let recorder = Recorder::new(
            Arc::clone(&source) as Arc<dyn InputSource>,
            Arc::clone(&session),
            notifier,
        );
        (recorder, source, session)
    }

    /// Polls until the session holds `count` events or the deadline passes.
    fn wait_for_events(session: &Arc<Mutex<Session>>, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if session.lock().unwrap().len() >= count {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("timed out waiting for {count} recorded events");
    }

    #[test]
    fn test_start_records_mouse_and_key_events() {
        // Arrange
        let (recorder, source, session) = make_recorder();
        assert!(recorder.start());

        // Act
        source.inject_click(100, 200, MouseButton::Left);
        source.inject_key_tap(RawKey::Char { ch: 'a', code: Some(0x41) });
        wait_for_events(&session, 4);

        // Assert
        let count = recorder.stop();
        assert_eq!(count, 4);
        let session = session.lock().unwrap();
        assert!(matches!(
            session.events()[0],
            RecordedEvent::Mouse { x: 100, y: 200, pressed: true, .. }
        ));
        assert!(matches!(&session.events()[2], RecordedEvent::KeyPress { key, .. } if key == "a"));
    }

    #[test]
    fn test_duplicate_start_is_rejected() {
        let (recorder, _source, _session) = make_recorder();
        assert!(recorder.start());
        assert!(!recorder.start());
        recorder.stop();
    }

    #[test]
    fn test_start_clears_previous_session() {
        // Arrange
        let (recorder, source, session) = make_recorder();
        assert!(recorder.start());
        source.inject_click(1, 1, MouseButton::Left);
        wait_for_events(&session, 2);
        recorder.stop();

        // Act – start a fresh recording
        assert!(recorder.start());

        // Assert
        assert!(session.lock().unwrap().is_empty());
        recorder.stop();
    }

    #[test]
    fn test_stop_while_idle_is_a_noop() {
        let (recorder, _source, _session) = make_recorder();
        assert_eq!(recorder.stop(), 0);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_hotkey_presses_are_not_recorded() {
        // Arrange – F1 is a configured hotkey
        let (recorder, source, session) = make_recorder();
        recorder.set_suppressed_keys(vec![KeyIdentity::Special(SpecialKey::F1)]);
        assert!(recorder.start());

        // Act – a hotkey tap followed by a normal key tap
        source.inject_key_tap(RawKey::Special(SpecialKey::F1));
        source.inject_key_tap(RawKey::Char { ch: 'x', code: Some(0x58) });
        wait_for_events(&session, 2);
        let count = recorder.stop();

        // Assert – only the 'x' press/release made it in
        assert_eq!(count, 2);
        let session = session.lock().unwrap();
        assert!(
            session
                .events()
                .iter()
                .all(|event| matches!(event, RecordedEvent::KeyPress { key, .. } | RecordedEvent::KeyRelease { key, .. } if key == "x"))
        );
    }

    #[test]
    fn test_suppression_matches_case_folded_identity() {
        // Arrange – hotkey stored from an uppercase capture
        let (recorder, source, session) = make_recorder();
        recorder.set_suppressed_keys(vec![KeyIdentity::Char('r')]);
        assert!(recorder.start());

        // Act – shifted press of the same physical key
        source.inject_key_tap(RawKey::Char { ch: 'R', code: Some(0x52) });
        source.inject_key_tap(RawKey::Char { ch: 'z', code: Some(0x5A) });
        wait_for_events(&session, 2);
        recorder.stop();

        // Assert
        let session = session.lock().unwrap();
        assert_eq!(session.len(), 2);
        assert!(matches!(&session.events()[0], RecordedEvent::KeyPress { key, .. } if key == "z"));
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        // Arrange
        let (recorder, source, session) = make_recorder();
        assert!(recorder.start());

        // Act
        for i in 0..5 {
            source.inject_click(i, i, MouseButton::Left);
        }
        wait_for_events(&session, 10);
        recorder.stop();

        // Assert
        let session = session.lock().unwrap();
        let timestamps: Vec<f64> = session.events().iter().map(|e| e.timestamp()).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]), "timestamps must not go backwards");
    }

    #[test]
    fn test_stop_reports_count_and_is_idempotent() {
        let (recorder, source, session) = make_recorder();
        assert!(recorder.start());
        source.inject_click(5, 5, MouseButton::Right);
        wait_for_events(&session, 2);

        assert_eq!(recorder.stop(), 2);
        // Second stop reports the same count without side effects.
        assert_eq!(recorder.stop(), 2);
    }
}
