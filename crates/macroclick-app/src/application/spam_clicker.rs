//! SpamClicker: bounded-rate rapid-fire clicking.
//!
//! Each cycle is one atomic press+release via [`InputInjector::click`], so
//! the loop can be cut off between cycles without any pressed-state
//! cleanup. The default interval is 10ms, about 100 clicks per second.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tracing::{info, warn};

use macroclick_core::MouseButton;

use crate::application::notifications::{Notifier, StatusLevel};
use crate::infrastructure::input_injection::InputInjector;

/// Delay between click cycles.
pub const DEFAULT_SPAM_INTERVAL: Duration = Duration::from_millis(10);

/// Rapid-fire left-click loop.
pub struct SpamClicker {
    injector: Arc<dyn InputInjector>,
    notifier: Notifier,
    clicking: Arc<AtomicBool>,
    interval: Duration,
}

impl SpamClicker {
    pub fn new(injector: Arc<dyn InputInjector>, notifier: Notifier) -> Self {
        Self::with_interval(injector, notifier, DEFAULT_SPAM_INTERVAL)
    }

    pub fn with_interval(
        injector: Arc<dyn InputInjector>,
        notifier: Notifier,
        interval: Duration,
    ) -> Self {
        Self {
            injector,
            notifier,
            clicking: Arc::new(AtomicBool::new(false)),
            interval,
        }
    }

    pub fn is_active(&self) -> bool {
        self.clicking.load(Ordering::SeqCst)
    }

    /// Starts the click loop on a background task.
    ///
    /// Fails when already clicking. Must be called from within a tokio
    /// runtime.
    pub fn start(&self) -> bool {
        if self
            .clicking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        self.notifier.status("Spam clicking active!", StatusLevel::Info);
        info!("spam clicking started");

        let injector = Arc::clone(&self.injector);
        let clicking = Arc::clone(&self.clicking);
        let interval = self.interval;
        tokio::spawn(async move {
            while clicking.load(Ordering::SeqCst) {
                if let Err(e) = injector.click(MouseButton::Left) {
                    warn!(error = %e, "spam click failed, continuing");
                }
                tokio::time::sleep(interval).await;
            }
        });
        true
    }

    /// Stops the click loop before its next cycle.
    ///
    /// Returns `false` when nothing was running.
    pub fn stop(&self) -> bool {
        if !self.clicking.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.notifier.status("Spam clicking stopped!", StatusLevel::Success);
        info!("spam clicking stopped");
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
