//! Input capture infrastructure.
//!
//! A capture backend produces [`CapturedEvent`]s on a plain `mpsc` channel:
//! the OS callback thread stays thin and all processing happens on the
//! consumer side. The [`InputSource`] trait is the seam between the
//! application layer and the OS. Production builds use the `rdev` backend
//! (feature `os-input`), tests use [`mock::MockInputSource`].

use std::sync::mpsc;

use macroclick_core::{MouseButton, RawKey};

pub mod mock;

#[cfg(feature = "os-input")]
pub mod rdev_backend;

/// A raw input event produced by a capture backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapturedEvent {
    /// A mouse button transition at an absolute screen position.
    MouseButton {
        x: i32,
        y: i32,
        button: MouseButton,
        pressed: bool,
    },
    /// A key transition.
    Key { key: RawKey, pressed: bool },
}

/// Error type for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to start input listener: {0}")]
    ListenerStartFailed(String),
    #[error("capture source is already running")]
    AlreadyStarted,
}

/// Trait abstracting input event production.
///
/// `start` hands back the receiving end of the event channel; `stop` closes
/// the channel and releases any OS resources. Both are safe to call from
/// any thread.
pub trait InputSource: Send + Sync {
    /// Starts the source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<CapturedEvent>, CaptureError>;

    /// Stops the source. The receiver returned by `start` disconnects.
    fn stop(&self);
}
