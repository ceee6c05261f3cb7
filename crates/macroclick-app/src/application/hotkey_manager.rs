//! HotkeyManager: global trigger keys and the capture sub-state.
//!
//! A dedicated keyboard feed is drained on its own thread. Every observed
//! press resolves to a [`KeyIdentity`] and either
//!
//! - **capture mode**: the press becomes the pending slot's new binding, a
//!   binding-changed notification fires, and capture mode exits; the press
//!   is never dispatched; or
//! - **normal mode**: the press is compared against the four bindings in
//!   fixed priority order (record, play, stop, spam) and the first match
//!   posts its [`HotkeyAction`] to the coordinator channel.
//!
//! Bindings live behind a mutex the dispatch loop reads per event, so once
//! a rebind call returns, the very next press is matched against the
//! updated bindings, with no listener restart involved.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread::JoinHandle;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use macroclick_core::{HotkeyBindings, HotkeyLabels, HotkeySlot, KeyIdentity};

use crate::application::notifications::{Notification, Notifier, StatusLevel};
use crate::infrastructure::input_capture::{CapturedEvent, InputSource};

/// Action dispatched to the coordinator when a hotkey fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleRecord,
    TogglePlay,
    StopAll,
    ToggleSpam,
}

impl HotkeyAction {
    fn for_slot(slot: HotkeySlot) -> HotkeyAction {
        match slot {
            HotkeySlot::Record => HotkeyAction::ToggleRecord,
            HotkeySlot::Play => HotkeyAction::TogglePlay,
            HotkeySlot::Stop => HotkeyAction::StopAll,
            HotkeySlot::Spam => HotkeyAction::ToggleSpam,
        }
    }
}

/// Owns the four bindings, the trigger listener and the capture sub-state.
pub struct HotkeyManager {
    source: Arc<dyn InputSource>,
    bindings: Arc<Mutex<HotkeyBindings>>,
    capturing: Arc<Mutex<Option<HotkeySlot>>>,
    actions: UnboundedSender<HotkeyAction>,
    notifier: Notifier,
    listening: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HotkeyManager {
    pub fn new(
        source: Arc<dyn InputSource>,
        actions: UnboundedSender<HotkeyAction>,
        notifier: Notifier,
    ) -> Self {
        Self {
            source,
            bindings: Arc::new(Mutex::new(HotkeyBindings::default())),
            capturing: Arc::new(Mutex::new(None)),
            actions,
            notifier,
            listening: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Starts the trigger listener. Fails when already listening or the
    /// feed cannot be started.
    pub fn start_listening(&self) -> bool {
        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let rx = match self.source.start() {
            Ok(rx) => rx,
            Err(e) => {
                self.listening.store(false, Ordering::SeqCst);
                self.notifier
                    .status(format!("Failed to start hotkey listener: {e}"), StatusLevel::Error);
                return false;
            }
        };

        let listening = Arc::clone(&self.listening);
        let bindings = Arc::clone(&self.bindings);
        let capturing = Arc::clone(&self.capturing);
        let actions = self.actions.clone();
        let notifier = self.notifier.clone();
        let handle = std::thread::spawn(move || {
            while let Ok(event) = rx.recv() {
                if !listening.load(Ordering::SeqCst) {
                    break;
                }
                let CapturedEvent::Key { key, pressed: true } = event else {
                    continue;
                };
                let identity = KeyIdentity::resolve(key);

                // Capture mode consumes the press instead of matching it.
                if let Some(slot) = capturing.lock().expect("lock poisoned").take() {
                    bindings.lock().expect("lock poisoned").set(slot, identity);
                    let label = identity.label();
                    info!(slot = slot.as_str(), key = %label, "hotkey rebound");
                    notifier.send(Notification::HotkeyCaptured { slot, label: label.clone() });
                    notifier.status(format!("Hotkey updated to {label}"), StatusLevel::Success);
                    continue;
                }

                let matched = bindings.lock().expect("lock poisoned").match_key(&identity);
                if let Some(slot) = matched {
                    debug!(slot = slot.as_str(), "hotkey matched");
                    let _ = actions.send(HotkeyAction::for_slot(slot));
                }
            }
            debug!("hotkey listener thread exiting");
        });
        *self.worker.lock().expect("lock poisoned") = Some(handle);
        true
    }

    /// Stops the trigger listener. Safe to call while idle.
    pub fn stop_listening(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            self.source.stop();
            if let Some(handle) = self.worker.lock().expect("lock poisoned").take() {
                let _ = handle.join();
            }
        }
    }

    /// Arms capture mode: the next observed press becomes `slot`'s binding.
    pub fn start_capture(&self, slot: HotkeySlot) {
        *self.capturing.lock().expect("lock poisoned") = Some(slot);
        self.notifier
            .status("Press a key to set as hotkey...", StatusLevel::Info);
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.lock().expect("lock poisoned").is_some()
    }

    /// Current bindings.
    pub fn bindings(&self) -> HotkeyBindings {
        self.bindings.lock().expect("lock poisoned").clone()
    }

    /// Directly rebinds one slot. Subsequent presses match the new binding.
    pub fn set_binding(&self, slot: HotkeySlot, key: KeyIdentity) {
        self.bindings.lock().expect("lock poisoned").set(slot, key);
        self.notifier.send(Notification::HotkeyCaptured { slot, label: key.label() });
    }

    /// Bulk-loads bindings from persisted display labels.
    pub fn apply_labels(&self, labels: &HotkeyLabels) {
        self.bindings.lock().expect("lock poisoned").apply_labels(labels);
    }

    /// The identities the recorder must suppress.
    pub fn suppressed_keys(&self) -> Vec<KeyIdentity> {
        self.bindings.lock().expect("lock poisoned").suppressed_keys()
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
