//! Engine lifecycle and the public input API.
//!
//! `Engine` owns one capture backend and one injector, both chosen at build
//! time for the target platform. `init()` opens the injector, then starts
//! capture; `cleanup()` stops capture (joining its thread) before the injector
//! is closed, so nothing is released while the background thread may still
//! use it. Both are idempotent and safe to call from any thread.
//!
//! Injection calls run on the caller's thread and may be issued concurrently.
//! They never touch observed state: whether a synthetic key-down shows up in
//! `is_key_pressed` depends on the OS echoing it back through capture.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::config::EngineConfig;
use crate::key::{key_name, Key};
use crate::platform::{
    self, InputCapture, InputInjector, KeyState, PlatformError, StateSource,
};
use crate::state::KeyStateStore;

// ---------------------------------------------------------------------------
// Status and errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Uninitialized,
    Running,
    ShuttingDown,
}

impl EngineStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineStatus::Running,
            2 => EngineStatus::ShuttingDown,
            _ => EngineStatus::Uninitialized,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            EngineStatus::Uninitialized => 0,
            EngineStatus::Running => 1,
            EngineStatus::ShuttingDown => 2,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// The capture listener could not be started. Fatal to `init()`.
    #[error("input listener install failed: {0}")]
    ListenerInstall(#[source] PlatformError),

    /// The injection resource could not be acquired. Fatal to `init()`.
    #[error("injector unavailable: {0}")]
    InjectorUnavailable(#[source] PlatformError),

    #[error("engine is not initialized")]
    NotInitialized,

    /// A single injection was rejected; the engine stays usable.
    #[error("injection failed: {0}")]
    Injection(#[source] PlatformError),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    config: EngineConfig,
    source: StateSource,
    status: AtomicU8,
    /// Also serializes `init()` and `cleanup()`.
    capture: Mutex<Box<dyn InputCapture>>,
    /// Read-locked by injection calls, write-locked to open and close.
    injector: RwLock<Box<dyn InputInjector>>,
}

impl Engine {
    /// Builds an engine with this platform's backends. No OS resources are
    /// acquired until `init()`.
    pub fn new(config: EngineConfig) -> Self {
        let store = Arc::new(KeyStateStore::new());
        let capture = platform::create_input_capture(&config, store);
        let injector = platform::create_input_injector(&config);
        Self::with_backends(config, capture, injector)
    }

    pub(crate) fn with_backends(
        config: EngineConfig,
        capture: Box<dyn InputCapture>,
        injector: Box<dyn InputInjector>,
    ) -> Self {
        Self {
            config,
            source: capture.source(),
            status: AtomicU8::new(EngineStatus::Uninitialized.as_u8()),
            capture: Mutex::new(capture),
            injector: RwLock::new(injector),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.status() == EngineStatus::Running
    }

    /// Acquires OS resources and starts background capture.
    ///
    /// Returns `Ok` immediately if already running. On failure everything
    /// acquired so far is released and the engine stays uninitialized.
    pub fn init(&self) -> Result<(), EngineError> {
        let mut capture = self.lock_capture();
        if self.is_running() {
            return Ok(());
        }

        if let Err(e) = self.write_injector().open() {
            log::error!("engine: init failed, injector unavailable: {e}");
            return Err(EngineError::InjectorUnavailable(e));
        }

        if let Err(e) = capture.start() {
            log::error!("engine: init failed, capture did not start: {e}");
            let _ = capture.stop();
            self.write_injector().close();
            return Err(EngineError::ListenerInstall(e));
        }

        self.set_status(EngineStatus::Running);
        log::info!("engine: initialized");
        Ok(())
    }

    /// Stops capture, waits for its thread, then releases all resources.
    /// Does nothing unless running.
    pub fn cleanup(&self) {
        let mut capture = self.lock_capture();
        if !self.is_running() {
            return;
        }

        self.set_status(EngineStatus::ShuttingDown);
        if let Err(e) = capture.stop() {
            log::warn!("engine: capture did not stop cleanly: {e}");
        }
        self.write_injector().close();
        self.set_status(EngineStatus::Uninitialized);
        log::info!("engine: cleaned up");
    }

    /// Latest known state of `key`: a live OS query on the hook backend, the
    /// observed state on the device-poll backend. Keys with no recorded
    /// events read as not pressed.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.source.is_pressed(key)
    }

    pub fn hold_key(&self, key: Key) -> Result<(), EngineError> {
        self.inject(|injector| injector.send_key(key, KeyState::Down))
    }

    pub fn release_key(&self, key: Key) -> Result<(), EngineError> {
        self.inject(|injector| injector.send_key(key, KeyState::Up))
    }

    /// Hold, sleep `delay_ms`, release. Not atomic with respect to other
    /// threads injecting the same key.
    pub fn press_key(&self, key: Key, delay_ms: u64) -> Result<(), EngineError> {
        self.hold_key(key)?;
        thread::sleep(Duration::from_millis(delay_ms));
        self.release_key(key)
    }

    /// `press_key` with the configured hold time (50 ms by default).
    pub fn tap_key(&self, key: Key) -> Result<(), EngineError> {
        self.press_key(key, self.config.injector.press_delay_ms)
    }

    /// Relative pointer motion. Not clamped.
    pub fn move_mouse(&self, dx: i32, dy: i32) -> Result<(), EngineError> {
        self.inject(|injector| injector.move_relative(dx, dy))
    }

    pub fn key_name(&self, key: Key) -> &'static str {
        key_name(key)
    }

    fn inject(
        &self,
        op: impl FnOnce(&dyn InputInjector) -> Result<(), PlatformError>,
    ) -> Result<(), EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotInitialized);
        }
        let injector = self.injector.read().unwrap_or_else(PoisonError::into_inner);
        op(injector.as_ref()).map_err(|e| {
            log::warn!("engine: injection failed: {e}");
            EngineError::Injection(e)
        })
    }

    fn set_status(&self, status: EngineStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    fn lock_capture(&self) -> MutexGuard<'_, Box<dyn InputCapture>> {
        self.capture.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_injector(&self) -> RwLockWriteGuard<'_, Box<dyn InputInjector>> {
        self.injector.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
