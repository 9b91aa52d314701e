//! Platform abstraction layer.
//!
//! Defines the `InputCapture` and `InputInjector` traits. One implementation of
//! each is compiled in per target:
//!
//! - Linux: device polling over `/dev/input/event*`, injection via uinput.
//! - Windows: `WH_KEYBOARD_LL` listener with live `GetAsyncKeyState` queries,
//!   injection via `SendInput`.
//! - Anything else: backends that refuse to start.

use std::sync::Arc;

use thiserror::Error;

use crate::config::EngineConfig;
use crate::key::Key;
use crate::state::KeyStateStore;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(test)]
pub(crate) mod mock;
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as backend;
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
use unsupported as backend;
#[cfg(target_os = "windows")]
use windows as backend;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("another engine instance already owns the keyboard listener")]
    AlreadyActive,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Direction of a synthetic key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// Where `is_key_pressed` gets its answer.
#[derive(Clone)]
pub enum StateSource {
    /// State maintained by a capture thread.
    Observed(Arc<KeyStateStore>),
    /// Point-in-time OS query, no caching.
    Live(fn(Key) -> bool),
}

impl StateSource {
    pub fn is_pressed(&self, key: Key) -> bool {
        match self {
            StateSource::Observed(store) => store.get(key),
            StateSource::Live(query) => query(key),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Keeps observed key state fresh on a background thread.
pub trait InputCapture: Send {
    /// Acquires capture resources and starts the background thread.
    fn start(&mut self) -> Result<(), PlatformError>;

    /// Signals the thread, waits for it to exit, then releases resources.
    /// Stopping an idle capture is a no-op.
    fn stop(&mut self) -> Result<(), PlatformError>;

    fn source(&self) -> StateSource;
}

/// Synthesizes keyboard and mouse events.
pub trait InputInjector: Send + Sync {
    /// Acquires the injection resource, if the backend needs one.
    fn open(&mut self) -> Result<(), PlatformError>;

    /// Releases the injection resource. Closing twice is a no-op.
    fn close(&mut self);

    fn send_key(&self, key: Key, state: KeyState) -> Result<(), PlatformError>;

    /// Relative pointer motion; no clamping.
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError>;
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Returns the capture backend for this target. `store` is only written by
/// backends that report `StateSource::Observed`.
pub fn create_input_capture(
    config: &EngineConfig,
    store: Arc<KeyStateStore>,
) -> Box<dyn InputCapture> {
    backend::create_input_capture(config, store)
}

pub fn create_input_injector(config: &EngineConfig) -> Box<dyn InputInjector> {
    backend::create_input_injector(config)
}
