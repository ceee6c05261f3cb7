//! Infrastructure adapters: input capture, input injection and persistence.
//!
//! Everything OS-facing lives behind a trait with a mock implementation, so
//! the application layer is fully testable without hooks or a display
//! server. The real backends compile only with the `os-input` feature.

pub mod input_capture;
pub mod input_injection;
pub mod storage;
