//! Integration tests for the coordinator: mutual exclusion, hotkey-driven
//! control flow and persistence.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedReceiver;

use macroclick_core::{HotkeySlot, KeyIdentity, MouseButton, PlaybackConfig, RawKey, SpecialKey};

use macroclick_app::application::{AppController, HotkeyAction, Notifier};
use macroclick_app::infrastructure::input_capture::mock::MockInputSource;
use macroclick_app::infrastructure::input_capture::InputSource;
use macroclick_app::infrastructure::input_injection::mock::MockInjector;
use macroclick_app::infrastructure::input_injection::InputInjector;

struct Harness {
    controller: Arc<AppController>,
    recorder_source: Arc<MockInputSource>,
    hotkey_source: Arc<MockInputSource>,
    injector: Arc<MockInjector>,
    actions: UnboundedReceiver<HotkeyAction>,
}

fn make_harness() -> Harness {
    let recorder_source = Arc::new(MockInputSource::new());
    let hotkey_source = Arc::new(MockInputSource::new());
    let injector = Arc::new(MockInjector::new());
    let (notifier, _notifications) = Notifier::channel();
    let (controller, actions) = AppController::new(
        Arc::clone(&recorder_source) as Arc<dyn InputSource>,
        Arc::clone(&hotkey_source) as Arc<dyn InputSource>,
        Arc::clone(&injector) as Arc<dyn InputInjector>,
        notifier,
    );
    Harness { controller, recorder_source, hotkey_source, injector, actions }
}

/// Async poll helper: background work lives on tokio tasks and capture
/// drain threads, so the test thread must keep yielding.
async fn wait_until<F: Fn() -> bool>(condition: F, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

async fn recv_action(rx: &mut UnboundedReceiver<HotkeyAction>) -> HotkeyAction {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for hotkey action")
        .expect("action channel closed")
}

/// Records a short session so playback has something to chew on.
async fn record_sample_session(harness: &Harness) {
    assert!(harness.controller.start_recording());
    harness.recorder_source.inject_click(10, 20, MouseButton::Left);
    wait_until(|| harness.controller.session_events().len() >= 2, "recorded events").await;
    assert_eq!(harness.controller.stop_recording(), 2);
}

// ── Mutual exclusion ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_playback_cannot_start_while_recording() {
    // Arrange
    let harness = make_harness();
    record_sample_session(&harness).await;
    assert!(harness.controller.start_recording());

    // Act / Assert
    assert!(!harness.controller.start_playback());
    // The recording session is untouched by the rejected start.
    assert!(harness.controller.is_recording());
    harness.controller.stop_recording();
}

#[tokio::test]
async fn test_recording_cannot_start_while_playing() {
    // Arrange – infinite playback keeps the player busy
    let harness = make_harness();
    record_sample_session(&harness).await;
    harness.controller.set_playback_config(PlaybackConfig {
        loop_count: 0,
        loop_delay_secs: 1.0,
        speed_multiplier: 1.0,
    });
    assert!(harness.controller.start_playback());

    // Act / Assert
    assert!(!harness.controller.start_recording());
    assert!(harness.controller.is_playing(), "rejected start must not stop playback");

    harness.controller.stop_playback();
}

#[tokio::test]
async fn test_spam_excludes_recording_and_playback() {
    // Arrange
    let harness = make_harness();
    record_sample_session(&harness).await;
    assert!(harness.controller.start_spam());

    // Act / Assert
    assert!(!harness.controller.start_recording());
    assert!(!harness.controller.start_playback());
    assert!(harness.controller.is_spam_clicking());

    assert!(harness.controller.stop_spam());
}

#[tokio::test]
async fn test_duplicate_spam_start_is_rejected() {
    let harness = make_harness();
    assert!(harness.controller.start_spam());
    assert!(!harness.controller.start_spam());
    harness.controller.stop_spam();
}

#[tokio::test]
async fn test_force_stop_is_safe_while_everything_is_idle() {
    let harness = make_harness();
    harness.controller.force_stop();
    assert!(!harness.controller.is_recording());
    assert!(!harness.controller.is_playing());
    assert!(!harness.controller.is_spam_clicking());
}

// ── Hotkey-driven flow ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_hotkey_press_marshals_action_that_toggles_recording() {
    // Arrange
    let mut harness = make_harness();
    assert!(harness.controller.start_hotkey_listener());

    // Act – press the default record hotkey; the listener posts, the
    // coordinator applies.
    harness.hotkey_source.inject_key_press(RawKey::Special(SpecialKey::F1));
    let action = recv_action(&mut harness.actions).await;
    harness.controller.handle_action(action);

    // Assert
    assert_eq!(action, HotkeyAction::ToggleRecord);
    assert!(harness.controller.is_recording());
    harness.controller.stop_recording();
    harness.controller.stop_hotkey_listener();
}

#[tokio::test]
async fn test_captured_shifted_key_triggers_on_unshifted_press() {
    // Arrange – capture the record slot while 'R' (shifted) is pressed
    let mut harness = make_harness();
    assert!(harness.controller.start_hotkey_listener());
    harness.controller.start_hotkey_capture(HotkeySlot::Record);
    harness
        .hotkey_source
        .inject_key_press(RawKey::Char { ch: 'R', code: Some(0x52) });
    wait_until(
        || harness.controller.bindings().get(HotkeySlot::Record) == &KeyIdentity::Char('r'),
        "capture to rebind the record slot",
    )
    .await;

    // Act – a plain 'r' press later
    harness
        .hotkey_source
        .inject_key_press(RawKey::Char { ch: 'r', code: Some(0x52) });
    let action = recv_action(&mut harness.actions).await;
    harness.controller.handle_action(action);

    // Assert – the record action fired
    assert_eq!(action, HotkeyAction::ToggleRecord);
    assert!(harness.controller.is_recording());
    harness.controller.stop_recording();
    harness.controller.stop_hotkey_listener();
}

#[tokio::test]
async fn test_stop_hotkey_stops_active_playback() {
    // Arrange
    let mut harness = make_harness();
    record_sample_session(&harness).await;
    assert!(harness.controller.start_hotkey_listener());
    harness.controller.set_playback_config(PlaybackConfig {
        loop_count: 0,
        loop_delay_secs: 1.0,
        speed_multiplier: 1.0,
    });
    assert!(harness.controller.start_playback());

    // Act – press the default stop hotkey (Esc)
    harness.hotkey_source.inject_key_press(RawKey::Special(SpecialKey::Escape));
    let action = recv_action(&mut harness.actions).await;
    harness.controller.handle_action(action);

    // Assert
    assert_eq!(action, HotkeyAction::StopAll);
    assert!(!harness.controller.is_playing());
    let (buttons, keys) = harness.injector.held_inputs();
    assert!(buttons.is_empty() && keys.is_empty());
    harness.controller.stop_hotkey_listener();
}

// ── Persistence ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_save_then_load_round_trips_session_and_settings() {
    // Arrange
    let harness = make_harness();
    record_sample_session(&harness).await;
    harness.controller.set_playback_config(PlaybackConfig {
        loop_count: 4,
        loop_delay_secs: 0.5,
        speed_multiplier: 2.0,
    });
    harness
        .controller
        .set_binding(HotkeySlot::Play, KeyIdentity::Special(SpecialKey::F6));
    let saved_events = harness.controller.session_events();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.aclk");

    // Act – save, disturb everything, load
    assert!(harness.controller.save_recording(&path));
    harness.controller.clear_recording();
    harness.controller.set_playback_config(PlaybackConfig::default());
    harness
        .controller
        .set_binding(HotkeySlot::Play, KeyIdentity::Special(SpecialKey::F2));
    assert!(harness.controller.load_recording(&path));

    // Assert – session, settings and bindings all came back
    assert_eq!(harness.controller.session_events(), saved_events);
    let config = harness.controller.playback_config();
    assert_eq!(config.loop_count, 4);
    assert_eq!(config.speed_multiplier, 2.0);
    assert_eq!(
        harness.controller.bindings().get(HotkeySlot::Play),
        &KeyIdentity::Special(SpecialKey::F6)
    );
}

#[tokio::test]
async fn test_loading_legacy_bare_array_file_succeeds_with_default_config() {
    // Arrange – a legacy writer produced a bare event array
    let harness = make_harness();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(&path, r#"[{"type": "key_press", "key": "a", "timestamp": 0.1}]"#).unwrap();

    // Act
    assert!(harness.controller.load_recording(&path));

    // Assert – events in, config at defaults (infinite loop, speed 1)
    assert_eq!(harness.controller.session_events().len(), 1);
    let config = harness.controller.playback_config();
    assert!(config.is_infinite());
    assert_eq!(config.speed_multiplier, 1.0);
}

#[tokio::test]
async fn test_loading_malformed_file_changes_nothing() {
    // Arrange
    let harness = make_harness();
    record_sample_session(&harness).await;
    let before = harness.controller.session_events();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"[{"key": "a", "timestamp": 0.1}]"#).unwrap();

    // Act
    assert!(!harness.controller.load_recording(&path));

    // Assert – the session kept its events
    assert_eq!(harness.controller.session_events(), before);
}

#[tokio::test]
async fn test_save_is_refused_while_recording() {
    let harness = make_harness();
    assert!(harness.controller.start_recording());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("refused.json");
    assert!(!harness.controller.save_recording(&path));
    assert!(!path.exists());

    harness.controller.stop_recording();
}
