//! Input injection infrastructure.
//!
//! The [`InputInjector`] trait is the seam between the playback/spam layers
//! and the OS event synthesis APIs. Production builds use the `enigo`
//! backend (feature `os-input`); tests use [`mock::MockInjector`].
//!
//! `click` is a dedicated operation rather than a press/release pair: the
//! spam loop relies on the cycle being atomic so it never needs pressed-state
//! cleanup.

use macroclick_core::{KeyIdentity, MouseButton};

pub mod mock;

#[cfg(feature = "os-input")]
pub mod enigo_backend;

/// Error type for injection operations.
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    #[error("platform injection error: {0}")]
    Platform(String),
    #[error("no injectable mapping for key {0:?}")]
    UnmappedKey(String),
}

/// Platform-agnostic input synthesis trait.
pub trait InputInjector: Send + Sync {
    /// Moves the pointer to an absolute screen position.
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), InjectionError>;

    /// Presses a mouse button.
    fn button_down(&self, button: MouseButton) -> Result<(), InjectionError>;

    /// Releases a mouse button.
    fn button_up(&self, button: MouseButton) -> Result<(), InjectionError>;

    /// Performs one atomic press+release cycle.
    fn click(&self, button: MouseButton) -> Result<(), InjectionError>;

    /// Presses a key.
    fn key_down(&self, key: &KeyIdentity) -> Result<(), InjectionError>;

    /// Releases a key.
    fn key_up(&self, key: &KeyIdentity) -> Result<(), InjectionError>;
}
