//! Player: replays a recorded session on a background timeline.
//!
//! The timeline honours per-event relative delay scaled by the speed
//! multiplier, loops `loop_count` times (0 = until stopped) with an optional
//! inter-loop delay, and drives a countdown notification during that delay.
//! All sleeps are chunked at 100ms and re-check the stop flag, so `stop()`
//! is perceived promptly.
//!
//! Every button or key the run presses is tracked in a pressed-state set
//! and force-released when the run terminates (on completion, on stop and
//! on injection errors alike), so playback can never leave input logically
//! stuck. `stop()` performs that cleanup synchronously before returning.
//! The flag is re-checked under the pressed-state lock before any press is
//! injected, so a stop that has already drained can never be trailed by a
//! late press.

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use tracing::{info, warn};

use macroclick_core::{KeyIdentity, MouseButton, PlaybackConfig, RecordedEvent};

use crate::application::notifications::{InputKind, Notification, Notifier, StatusLevel};
use crate::infrastructure::input_injection::InputInjector;

/// Granularity of all interruptible waits.
const STOP_POLL: Duration = Duration::from_millis(100);

/// Buttons and keys pressed by the current run and not yet released.
#[derive(Default)]
struct PressedState {
    buttons: HashSet<MouseButton>,
    keys: HashSet<KeyIdentity>,
}

/// Replays recorded sessions.
pub struct Player {
    injector: Arc<dyn InputInjector>,
    notifier: Notifier,
    playing: Arc<AtomicBool>,
    pressed: Arc<Mutex<PressedState>>,
}

impl Player {
    pub fn new(injector: Arc<dyn InputInjector>, notifier: Notifier) -> Self {
        Self {
            injector,
            notifier,
            playing: Arc::new(AtomicBool::new(false)),
            pressed: Arc::new(Mutex::new(PressedState::default())),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Starts a playback run on a background task.
    ///
    /// Fails without state change when `events` is empty or a run is
    /// already active. Must be called from within a tokio runtime.
    pub fn start(&self, events: Arc<Vec<RecordedEvent>>, config: PlaybackConfig) -> bool {
        if events.is_empty() {
            self.notifier.status("No events to play!", StatusLevel::Error);
            return false;
        }
        if self
            .playing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        if config.is_infinite() {
            self.notifier
                .status("Playing recording (Infinite loops)...", StatusLevel::Info);
        } else {
            self.notifier.status(
                format!("Playing recording ({} loops)...", config.loop_count),
                StatusLevel::Info,
            );
        }

        let injector = Arc::clone(&self.injector);
        let notifier = self.notifier.clone();
        let playing = Arc::clone(&self.playing);
        let pressed = Arc::clone(&self.pressed);
        tokio::spawn(async move {
            run_timeline(injector, notifier, playing, pressed, events, config).await;
        });
        true
    }

    /// Stops the current run.
    ///
    /// Returns `false` when nothing is playing. On success the pressed-state
    /// set has been drained (all forced releases issued) before this
    /// returns.
    pub fn stop(&self) -> bool {
        if !self.playing.swap(false, Ordering::SeqCst) {
            return false;
        }
        release_all_pressed(&self.injector, &self.pressed);
        self.notifier.status("Playback stopped!", StatusLevel::Warning);
        true
    }
}

/// The background playback timeline.
async fn run_timeline(
    injector: Arc<dyn InputInjector>,
    notifier: Notifier,
    playing: Arc<AtomicBool>,
    pressed: Arc<Mutex<PressedState>>,
    events: Arc<Vec<RecordedEvent>>,
    config: PlaybackConfig,
) {
    // Discard stale entries a previously aborted run may have left behind.
    {
        let mut state = pressed.lock().expect("lock poisoned");
        state.buttons.clear();
        state.keys.clear();
    }

    let mut completed_loops: u32 = 0;
    loop {
        if !playing.load(Ordering::SeqCst) {
            break;
        }
        if config.loop_count > 0 && completed_loops >= config.loop_count {
            break;
        }

        // Delay between loops, not before the first one.
        if completed_loops > 0 && config.loop_delay_secs > 0.0 {
            wait_with_countdown(config.loop_delay_secs, &playing, &notifier).await;
        }

        completed_loops += 1;
        if config.is_infinite() {
            notifier.status(
                format!("Playing loop {completed_loops} (Infinite)..."),
                StatusLevel::Info,
            );
        } else {
            notifier.status(
                format!("Playing loop {completed_loops}/{}...", config.loop_count),
                StatusLevel::Info,
            );
        }

        let mut last_timestamp = 0.0_f64;
        for event in events.iter() {
            if !playing.load(Ordering::SeqCst) {
                break;
            }

            // Wait out the recorded gap, scaled by the speed multiplier.
            // Non-positive speed replays with no delay rather than hanging.
            let gap = event.timestamp() - last_timestamp;
            if gap > 0.0 && config.speed_multiplier > 0.0 {
                interruptible_sleep(gap / config.speed_multiplier, &playing).await;
            }
            last_timestamp = event.timestamp();

            if !playing.load(Ordering::SeqCst) {
                break;
            }
            execute_event(&injector, &notifier, &playing, &pressed, event);
        }

        // A zero-delay session looping infinitely has no other await point;
        // yield so the runtime (and `stop()`) stays responsive.
        tokio::task::yield_now().await;
    }

    // Termination path for completion and stop alike: force-release
    // whatever is still held, then signal exactly one completion.
    release_all_pressed(&injector, &pressed);
    playing.store(false, Ordering::SeqCst);
    info!(loops = completed_loops, "playback finished");
    notifier.send(Notification::PlaybackFinished);
    notifier.status("Playback completed!", StatusLevel::Success);
}

/// Sleeps `secs`, waking early when the stop flag clears.
async fn interruptible_sleep(secs: f64, playing: &AtomicBool) {
    let mut remaining = secs;
    while remaining > 0.0 && playing.load(Ordering::SeqCst) {
        let chunk = remaining.min(STOP_POLL.as_secs_f64());
        tokio::time::sleep(Duration::from_secs_f64(chunk)).await;
        remaining -= chunk;
    }
}

/// Inter-loop delay with countdown notifications at poll granularity.
async fn wait_with_countdown(delay_secs: f64, playing: &AtomicBool, notifier: &Notifier) {
    let mut remaining = delay_secs;
    while remaining > 0.0 && playing.load(Ordering::SeqCst) {
        notifier.send(Notification::CountdownTick { remaining_secs: remaining });
        let chunk = remaining.min(STOP_POLL.as_secs_f64());
        tokio::time::sleep(Duration::from_secs_f64(chunk)).await;
        remaining -= chunk;
    }
    if playing.load(Ordering::SeqCst) {
        notifier.send(Notification::CountdownTick { remaining_secs: 0.0 });
    }
}

/// Executes one recorded event.
///
/// Injection failures are logged and swallowed so one bad event never kills
/// the run. An unresolvable stored key name is skipped the same way.
fn execute_event(
    injector: &Arc<dyn InputInjector>,
    notifier: &Notifier,
    playing: &AtomicBool,
    pressed: &Mutex<PressedState>,
    event: &RecordedEvent,
) {
    match event {
        RecordedEvent::Mouse { x, y, button, pressed: is_press, .. } => {
            let button = MouseButton::parse_lenient(button);
            if let Err(e) = injector.move_pointer(*x, *y) {
                warn!(error = %e, "pointer move failed, continuing");
            }

            let mut state = pressed.lock().expect("lock poisoned");
            if !playing.load(Ordering::SeqCst) {
                return;
            }
            let result = if *is_press {
                state.buttons.insert(button);
                injector.button_down(button)
            } else {
                state.buttons.remove(&button);
                injector.button_up(button)
            };
            drop(state);

            if let Err(e) = result {
                warn!(button = button.as_str(), error = %e, "mouse injection failed, continuing");
            } else if *is_press {
                notifier.send(Notification::LiveInput {
                    kind: InputKind::Mouse,
                    text: format!("{} ({x}, {y})", button.as_str().to_uppercase()),
                });
            }
        }
        RecordedEvent::KeyPress { key, .. } => {
            let Some(identity) = KeyIdentity::parse(key) else {
                warn!(key = %key, "unresolvable key name, skipping event");
                return;
            };

            let mut state = pressed.lock().expect("lock poisoned");
            if !playing.load(Ordering::SeqCst) {
                return;
            }
            state.keys.insert(identity);
            let result = injector.key_down(&identity);
            drop(state);

            if let Err(e) = result {
                warn!(key = %key, error = %e, "key press injection failed, continuing");
            } else {
                notifier.send(Notification::LiveInput {
                    kind: InputKind::Key,
                    text: identity.label(),
                });
            }
        }
        RecordedEvent::KeyRelease { key, .. } => {
            let Some(identity) = KeyIdentity::parse(key) else {
                warn!(key = %key, "unresolvable key name, skipping event");
                return;
            };

            let mut state = pressed.lock().expect("lock poisoned");
            state.keys.remove(&identity);
            let result = injector.key_up(&identity);
            drop(state);

            if let Err(e) = result {
                warn!(key = %key, error = %e, "key release injection failed, continuing");
            }
        }
    }
}

/// Drains the pressed-state set, issuing a forced release for every entry.
///
/// Each release failure is swallowed individually so one bad release never
/// blocks the rest. Draining under the lock means concurrent callers (the
/// timeline's termination path and `stop()`) release each entry exactly
/// once.
fn release_all_pressed(injector: &Arc<dyn InputInjector>, pressed: &Mutex<PressedState>) {
    let (buttons, keys) = {
        let mut state = pressed.lock().expect("lock poisoned");
        (
            state.buttons.drain().collect::<Vec<_>>(),
            state.keys.drain().collect::<Vec<_>>(),
        )
    };
    for button in buttons {
        if let Err(e) = injector.button_up(button) {
            warn!(button = button.as_str(), error = %e, "forced release failed");
        }
    }
    for key in keys {
        if let Err(e) = injector.key_up(&key) {
            warn!(key = %key.label(), error = %e, "forced release failed");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::application::notifications::NotificationReceiver;
    use crate::infrastructure::input_injection::mock::{InjectorCall, MockInjector};

    fn make_player() -> (Player, Arc<MockInjector>, NotificationReceiver) {
        let injector = Arc::new(MockInjector::new());
        let (notifier, rx) = Notifier::channel();
        let player = Player::new(Arc::clone(&injector) as Arc<dyn InputInjector>, notifier);
        (player, injector, rx)
    }

    fn click_session() -> Arc<Vec<RecordedEvent>> {
        Arc::new(vec![
            RecordedEvent::Mouse {
                x: 100,
                y: 100,
                button: "left".to_string(),
                pressed: true,
                timestamp: 0.0,
            },
            RecordedEvent::Mouse {
                x: 100,
                y: 100,
                button: "left".to_string(),
                pressed: false,
                timestamp: 0.1,
            },
        ])
    }

    fn single_config(speed: f64) -> PlaybackConfig {
        PlaybackConfig { loop_count: 1, loop_delay_secs: 0.0, speed_multiplier: speed }
    }

    /// Drains notifications until `PlaybackFinished` (plus a short quiet
    /// window) and returns how many finish notifications were seen.
    async fn wait_for_finish(rx: &mut NotificationReceiver) -> usize {
        let mut finished = 0;
        let deadline = Duration::from_secs(3);
        let _ = tokio::time::timeout(deadline, async {
            while let Some(notification) = rx.recv().await {
                if notification == Notification::PlaybackFinished {
                    finished += 1;
                    break;
                }
            }
        })
        .await;
        // Catch any stray duplicate completion.
        tokio::time::sleep(Duration::from_millis(100)).await;
        while let Ok(notification) = rx.try_recv() {
            if notification == Notification::PlaybackFinished {
                finished += 1;
            }
        }
        finished
    }

    async fn wait_until_idle(player: &Player) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while player.is_playing() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!player.is_playing(), "player should have gone idle");
    }

    // ── Basic runs ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_single_loop_click_replays_press_then_release() {
        // Arrange
        let (player, injector, mut rx) = make_player();

        // Act
        assert!(player.start(click_session(), single_config(1.0)));
        let finished = wait_for_finish(&mut rx).await;
        wait_until_idle(&player).await;

        // Assert – exactly one press then one release at (100, 100)
        let calls = injector.timed_calls();
        let sequence: Vec<&InjectorCall> = calls.iter().map(|(call, _)| call).collect();
        assert_eq!(
            sequence,
            vec![
                &InjectorCall::MovePointer { x: 100, y: 100 },
                &InjectorCall::ButtonDown(MouseButton::Left),
                &InjectorCall::MovePointer { x: 100, y: 100 },
                &InjectorCall::ButtonUp(MouseButton::Left),
            ]
        );

        // ~0.1s between press and release
        let press_at = calls[1].1;
        let release_at = calls[3].1;
        let gap = release_at.duration_since(press_at);
        assert!(gap >= Duration::from_millis(60), "gap too short: {gap:?}");
        assert!(gap <= Duration::from_millis(500), "gap too long: {gap:?}");

        // Exactly one completion notification
        assert_eq!(finished, 1);
    }

    #[tokio::test]
    async fn test_empty_session_is_rejected() {
        let (player, _injector, _rx) = make_player();
        assert!(!player.start(Arc::new(Vec::new()), single_config(1.0)));
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_duplicate_start_is_rejected() {
        // Arrange – a session long enough to still be running
        let (player, _injector, mut rx) = make_player();
        let events = Arc::new(vec![RecordedEvent::KeyPress {
            key: "a".to_string(),
            timestamp: 0.5,
        }]);

        // Act
        assert!(player.start(Arc::clone(&events), single_config(1.0)));
        assert!(!player.start(events, single_config(1.0)));

        // Cleanup
        wait_for_finish(&mut rx).await;
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_a_noop() {
        let (player, injector, _rx) = make_player();
        assert!(!player.stop());
        assert!(injector.calls().is_empty());
    }

    // ── Ordering and speed ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_replay_preserves_recorded_order_at_high_speed() {
        // Arrange
        let (player, injector, mut rx) = make_player();
        let events = Arc::new(vec![
            RecordedEvent::KeyPress { key: "a".to_string(), timestamp: 0.0 },
            RecordedEvent::KeyRelease { key: "a".to_string(), timestamp: 0.05 },
            RecordedEvent::KeyPress { key: "b".to_string(), timestamp: 0.1 },
            RecordedEvent::KeyRelease { key: "b".to_string(), timestamp: 0.15 },
        ]);

        // Act
        assert!(player.start(events, single_config(5.0)));
        wait_for_finish(&mut rx).await;

        // Assert
        assert_eq!(
            injector.calls(),
            vec![
                InjectorCall::KeyDown(KeyIdentity::Char('a')),
                InjectorCall::KeyUp(KeyIdentity::Char('a')),
                InjectorCall::KeyDown(KeyIdentity::Char('b')),
                InjectorCall::KeyUp(KeyIdentity::Char('b')),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_speed_completes_without_waiting() {
        // Arrange – timestamps that would take 20s at recorded speed
        let (player, injector, mut rx) = make_player();
        let events = Arc::new(vec![
            RecordedEvent::KeyPress { key: "a".to_string(), timestamp: 0.0 },
            RecordedEvent::KeyRelease { key: "a".to_string(), timestamp: 20.0 },
        ]);

        // Act
        let started = Instant::now();
        assert!(player.start(events, single_config(0.0)));
        let finished = wait_for_finish(&mut rx).await;

        // Assert – bounded time, all events executed
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(finished, 1);
        assert_eq!(injector.calls().len(), 2);
    }

    // ── Stop and liveness ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_stop_during_infinite_loop_releases_pressed_input() {
        // Arrange – infinite loop holding the button for most of each pass
        let (player, injector, _rx) = make_player();
        let events = Arc::new(vec![
            RecordedEvent::Mouse {
                x: 10,
                y: 10,
                button: "left".to_string(),
                pressed: true,
                timestamp: 0.0,
            },
            RecordedEvent::Mouse {
                x: 10,
                y: 10,
                button: "left".to_string(),
                pressed: false,
                timestamp: 5.0,
            },
        ]);
        let config = PlaybackConfig { loop_count: 0, loop_delay_secs: 0.0, speed_multiplier: 1.0 };
        assert!(player.start(events, config));

        // Act – stop within 300ms of starting
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(player.stop());

        // Assert – not playing and nothing held down once stop returns
        assert!(!player.is_playing());
        let (buttons, keys) = injector.held_inputs();
        assert!(buttons.is_empty(), "buttons still held: {buttons:?}");
        assert!(keys.is_empty(), "keys still held: {keys:?}");
    }

    #[tokio::test]
    async fn test_unmatched_press_is_released_exactly_once_on_completion() {
        // Arrange – a press with no matching release in the session
        let (player, injector, mut rx) = make_player();
        let events = Arc::new(vec![RecordedEvent::KeyPress {
            key: "a".to_string(),
            timestamp: 0.0,
        }]);

        // Act
        assert!(player.start(events, single_config(1.0)));
        let finished = wait_for_finish(&mut rx).await;
        wait_until_idle(&player).await;

        // Assert
        assert_eq!(finished, 1);
        assert_eq!(injector.key_up_count(&KeyIdentity::Char('a')), 1);
        let (_, keys) = injector.held_inputs();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_stop_then_completion_does_not_double_release() {
        // Arrange – long gap after an unmatched press keeps the run alive
        let (player, injector, mut rx) = make_player();
        let events = Arc::new(vec![
            RecordedEvent::KeyPress { key: "a".to_string(), timestamp: 0.0 },
            RecordedEvent::KeyPress { key: "b".to_string(), timestamp: 10.0 },
        ]);
        assert!(player.start(events, single_config(1.0)));
        tokio::time::sleep(Duration::from_millis(150)).await;

        // Act – stop drains; the worker's own termination drain finds nothing
        assert!(player.stop());
        wait_for_finish(&mut rx).await;

        // Assert
        assert_eq!(injector.key_up_count(&KeyIdentity::Char('a')), 1);
    }

    // ── Error handling ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_injection_failure_skips_event_and_continues() {
        // Arrange – key ops fail, mouse ops succeed
        let (player, injector, mut rx) = make_player();
        injector.set_fail_keys(true);
        let events = Arc::new(vec![
            RecordedEvent::KeyPress { key: "a".to_string(), timestamp: 0.0 },
            RecordedEvent::Mouse {
                x: 1,
                y: 2,
                button: "left".to_string(),
                pressed: true,
                timestamp: 0.01,
            },
            RecordedEvent::Mouse {
                x: 1,
                y: 2,
                button: "left".to_string(),
                pressed: false,
                timestamp: 0.02,
            },
        ]);

        // Act
        assert!(player.start(events, single_config(1.0)));
        let finished = wait_for_finish(&mut rx).await;

        // Assert – the mouse events went through despite the key failure
        assert_eq!(finished, 1);
        let calls = injector.calls();
        assert!(calls.contains(&InjectorCall::ButtonDown(MouseButton::Left)));
        assert!(calls.contains(&InjectorCall::ButtonUp(MouseButton::Left)));
    }

    #[tokio::test]
    async fn test_unresolvable_key_name_is_skipped() {
        // Arrange
        let (player, injector, mut rx) = make_player();
        let events = Arc::new(vec![
            RecordedEvent::KeyPress { key: "no_such_key_name".to_string(), timestamp: 0.0 },
            RecordedEvent::KeyPress { key: "a".to_string(), timestamp: 0.01 },
            RecordedEvent::KeyRelease { key: "a".to_string(), timestamp: 0.02 },
        ]);

        // Act
        assert!(player.start(events, single_config(1.0)));
        let finished = wait_for_finish(&mut rx).await;

        // Assert
        assert_eq!(finished, 1);
        assert_eq!(
            injector.calls(),
            vec![
                InjectorCall::KeyDown(KeyIdentity::Char('a')),
                InjectorCall::KeyUp(KeyIdentity::Char('a')),
            ]
        );
    }

    // ── Loops ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_loop_count_replays_session_that_many_times() {
        // Arrange
        let (player, injector, mut rx) = make_player();
        let events = Arc::new(vec![
            RecordedEvent::KeyPress { key: "a".to_string(), timestamp: 0.0 },
            RecordedEvent::KeyRelease { key: "a".to_string(), timestamp: 0.01 },
        ]);
        let config = PlaybackConfig { loop_count: 3, loop_delay_secs: 0.0, speed_multiplier: 0.0 };

        // Act
        assert!(player.start(events, config));
        let finished = wait_for_finish(&mut rx).await;

        // Assert – 3 loops x 2 events, one completion
        assert_eq!(finished, 1);
        assert_eq!(injector.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_loop_delay_emits_countdown_ticks() {
        // Arrange
        let (player, _injector, mut rx) = make_player();
        let events = Arc::new(vec![RecordedEvent::KeyPress {
            key: "a".to_string(),
            timestamp: 0.0,
        }]);
        let config = PlaybackConfig { loop_count: 2, loop_delay_secs: 0.3, speed_multiplier: 0.0 };

        // Act
        assert!(player.start(events, config));
        let mut ticks = 0;
        let _ = tokio::time::timeout(Duration::from_secs(3), async {
            while let Some(notification) = rx.recv().await {
                match notification {
                    Notification::CountdownTick { .. } => ticks += 1,
                    Notification::PlaybackFinished => break,
                    _ => {}
                }
            }
        })
        .await;

        // Assert – a 0.3s delay at 100ms granularity yields several ticks
        // plus the final zero tick.
        assert!(ticks >= 3, "expected countdown ticks, got {ticks}");
    }
}
