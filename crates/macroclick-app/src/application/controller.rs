//! AppController: the single coordinating context.
//!
//! Owns the session, the four activities and the UI-adjacent settings, and
//! enforces the application-level rules the activities cannot see on their
//! own:
//!
//! - recording, playback and spam-clicking are mutually exclusive: a start
//!   while another activity is active is rejected outright, never queued;
//! - hotkey actions arriving from the listener thread are marshalled here
//!   through a channel and applied on the coordinator task, so no listener
//!   callback ever touches shared state directly;
//! - save/load are refused while any activity is running, and a load
//!   replaces the session, the playback settings and the hotkey bindings
//!   as one unit.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};

use macroclick_core::{
    HotkeyBindings, HotkeySlot, KeyIdentity, PlaybackConfig, RecordedEvent, Session,
};

use crate::application::hotkey_manager::{HotkeyAction, HotkeyManager};
use crate::application::notifications::{Notifier, StatusLevel};
use crate::application::player::Player;
use crate::application::recorder::Recorder;
use crate::application::spam_clicker::SpamClicker;
use crate::infrastructure::input_capture::InputSource;
use crate::infrastructure::input_injection::InputInjector;
use crate::infrastructure::storage::{recording, RecordingConfig};

/// Coordinates the recorder, player, spam clicker and hotkey manager.
pub struct AppController {
    session: Arc<Mutex<Session>>,
    recorder: Recorder,
    player: Player,
    spam: SpamClicker,
    hotkeys: HotkeyManager,
    playback: Mutex<PlaybackConfig>,
    notifier: Notifier,
}

impl AppController {
    /// Wires the components together.
    ///
    /// `recorder_source` and `hotkey_source` are independent capture feeds;
    /// the returned receiver carries the hotkey actions for
    /// [`run`](Self::run).
    pub fn new(
        recorder_source: Arc<dyn InputSource>,
        hotkey_source: Arc<dyn InputSource>,
        injector: Arc<dyn InputInjector>,
        notifier: Notifier,
    ) -> (Arc<Self>, UnboundedReceiver<HotkeyAction>) {
        let session = Arc::new(Mutex::new(Session::new()));
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let controller = Arc::new(Self {
            recorder: Recorder::new(recorder_source, Arc::clone(&session), notifier.clone()),
            player: Player::new(Arc::clone(&injector), notifier.clone()),
            spam: SpamClicker::new(injector, notifier.clone()),
            hotkeys: HotkeyManager::new(hotkey_source, action_tx, notifier.clone()),
            session,
            playback: Mutex::new(PlaybackConfig::default()),
            notifier,
        });
        (controller, action_rx)
    }

    /// Drains hotkey actions onto this coordinator until the channel closes.
    pub async fn run(self: Arc<Self>, mut actions: UnboundedReceiver<HotkeyAction>) {
        while let Some(action) = actions.recv().await {
            self.handle_action(action);
        }
    }

    /// Applies one marshalled hotkey action.
    pub fn handle_action(&self, action: HotkeyAction) {
        match action {
            HotkeyAction::ToggleRecord => self.toggle_recording(),
            HotkeyAction::TogglePlay => self.toggle_playback(),
            HotkeyAction::StopAll => self.force_stop(),
            HotkeyAction::ToggleSpam => self.toggle_spam(),
        }
    }

    // ── Recording ─────────────────────────────────────────────────────────────

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn toggle_recording(&self) {
        if self.recorder.is_recording() {
            self.stop_recording();
        } else {
            self.start_recording();
        }
    }

    /// Starts recording unless playback or spam-clicking is active.
    pub fn start_recording(&self) -> bool {
        if self.spam.is_active() {
            self.notifier.status("Stop spam clicking first!", StatusLevel::Error);
            return false;
        }
        if self.player.is_playing() {
            self.notifier.status("Stop playback first!", StatusLevel::Error);
            return false;
        }
        // Refresh the suppression set so rebound hotkeys never leak into
        // the new recording.
        self.recorder.set_suppressed_keys(self.hotkeys.suppressed_keys());
        self.recorder.start()
    }

    /// Stops recording; returns the captured-event count.
    pub fn stop_recording(&self) -> usize {
        self.recorder.stop()
    }

    pub fn clear_recording(&self) {
        if self.recorder.is_recording() || self.player.is_playing() {
            self.notifier
                .status("Stop the current activity first!", StatusLevel::Error);
            return;
        }
        self.recorder.clear();
    }

    // ── Playback ──────────────────────────────────────────────────────────────

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn toggle_playback(&self) {
        if self.player.is_playing() {
            self.player.stop();
        } else {
            self.start_playback();
        }
    }

    /// Starts playback of the current session with the current settings,
    /// unless recording or spam-clicking is active.
    pub fn start_playback(&self) -> bool {
        if self.recorder.is_recording() {
            self.notifier.status("Stop recording first!", StatusLevel::Error);
            return false;
        }
        if self.spam.is_active() {
            self.notifier.status("Stop spam clicking first!", StatusLevel::Error);
            return false;
        }
        let snapshot = self.session.lock().expect("lock poisoned").snapshot();
        let config = *self.playback.lock().expect("lock poisoned");
        self.player.start(snapshot, config)
    }

    /// Stops playback; returns `false` when nothing was playing.
    pub fn stop_playback(&self) -> bool {
        self.player.stop()
    }

    // ── Spam clicking ─────────────────────────────────────────────────────────

    pub fn is_spam_clicking(&self) -> bool {
        self.spam.is_active()
    }

    pub fn toggle_spam(&self) {
        if self.spam.is_active() {
            self.spam.stop();
        } else {
            self.start_spam();
        }
    }

    /// Starts spam-clicking unless recording or playback is active.
    pub fn start_spam(&self) -> bool {
        if self.recorder.is_recording() {
            self.notifier.status("Stop recording first!", StatusLevel::Error);
            return false;
        }
        if self.player.is_playing() {
            self.notifier.status("Stop playback first!", StatusLevel::Error);
            return false;
        }
        self.spam.start()
    }

    pub fn stop_spam(&self) -> bool {
        self.spam.stop()
    }

    /// Stops whatever is active. Safe to call any time.
    pub fn force_stop(&self) {
        if self.recorder.is_recording() {
            self.recorder.stop();
        }
        self.player.stop();
        self.spam.stop();
    }

    // ── Hotkeys ───────────────────────────────────────────────────────────────

    pub fn start_hotkey_listener(&self) -> bool {
        self.hotkeys.start_listening()
    }

    pub fn stop_hotkey_listener(&self) {
        self.hotkeys.stop_listening();
    }

    /// Arms hotkey capture: the next key press becomes `slot`'s binding.
    pub fn start_hotkey_capture(&self, slot: HotkeySlot) {
        self.hotkeys.start_capture(slot);
    }

    pub fn bindings(&self) -> HotkeyBindings {
        self.hotkeys.bindings()
    }

    pub fn set_binding(&self, slot: HotkeySlot, key: KeyIdentity) {
        self.hotkeys.set_binding(slot, key);
    }

    /// Bulk-loads bindings from persisted display labels.
    pub fn apply_hotkey_labels(&self, labels: &macroclick_core::HotkeyLabels) {
        self.hotkeys.apply_labels(labels);
    }

    // ── Settings and session access ───────────────────────────────────────────

    pub fn playback_config(&self) -> PlaybackConfig {
        *self.playback.lock().expect("lock poisoned")
    }

    pub fn set_playback_config(&self, config: PlaybackConfig) {
        *self.playback.lock().expect("lock poisoned") = config;
    }

    /// A copy of the current session's events.
    pub fn session_events(&self) -> Vec<RecordedEvent> {
        self.session.lock().expect("lock poisoned").events().to_vec()
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Saves the current session and settings. Refused while recording or
    /// playing.
    pub fn save_recording(&self, path: &Path) -> bool {
        if self.recorder.is_recording() || self.player.is_playing() {
            self.notifier
                .status("Stop the current activity before saving!", StatusLevel::Error);
            return false;
        }

        let events = self.session_events();
        let playback = self.playback_config();
        let config = RecordingConfig {
            loops: playback.loop_count,
            delay: playback.loop_delay_secs,
            speed: playback.speed_multiplier,
            hotkeys: Some(self.hotkeys.bindings().labels()),
        };

        match recording::save_recording(path, &events, &config) {
            Ok(()) => {
                info!(path = %path.display(), events = events.len(), "recording saved");
                self.notifier.status(
                    format!("Recording saved: {} events", events.len()),
                    StatusLevel::Success,
                );
                true
            }
            Err(e) => {
                warn!(error = %e, "saving recording failed");
                self.notifier
                    .status(format!("Error saving recording: {e}"), StatusLevel::Error);
                false
            }
        }
    }

    /// Loads a recording, replacing the session, the playback settings and
    /// (when present) the hotkey bindings as one unit. Refused while
    /// recording or playing; a failed load changes nothing.
    pub fn load_recording(&self, path: &Path) -> bool {
        if self.recorder.is_recording() || self.player.is_playing() {
            self.notifier
                .status("Stop the current activity before loading!", StatusLevel::Error);
            return false;
        }

        match recording::load_recording(path) {
            Ok(loaded) => {
                let count = loaded.events.len();
                self.session
                    .lock()
                    .expect("lock poisoned")
                    .replace(loaded.events);
                self.set_playback_config(loaded.config.playback());
                if let Some(labels) = &loaded.config.hotkeys {
                    self.hotkeys.apply_labels(labels);
                }
                info!(path = %path.display(), events = count, "recording loaded");
                self.notifier.status(
                    format!("Recording loaded: {count} events"),
                    StatusLevel::Success,
                );
                true
            }
            Err(e) => {
                warn!(error = %e, "loading recording failed");
                self.notifier
                    .status(format!("Error loading recording: {e}"), StatusLevel::Error);
                false
            }
        }
    }
}
