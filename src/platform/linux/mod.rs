//! Linux platform backend.
//!
//! Capture: non-blocking polling of /dev/input/event* via `DevicePollCapture`.
//! Injection: uinput virtual device via `UinputInjector`.
//!
//! Capture has no hard requirements and degrades to observing nothing; the
//! injector needs write access to /dev/uinput and its failure aborts init.

mod capture;
mod injector;
pub mod keycodes;

use std::sync::Arc;

use capture::DevicePollCapture;
use injector::UinputInjector;

use crate::config::EngineConfig;
use crate::platform::{InputCapture, InputInjector};
use crate::state::KeyStateStore;

/// Returns the evdev polling capture backend.
pub fn create_input_capture(
    config: &EngineConfig,
    store: Arc<KeyStateStore>,
) -> Box<dyn InputCapture> {
    Box::new(DevicePollCapture::new(config, store))
}

/// Returns the uinput injector. The device itself is created by `open()`.
pub fn create_input_injector(config: &EngineConfig) -> Box<dyn InputInjector> {
    Box::new(UinputInjector::new(config))
}
