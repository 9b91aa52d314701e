//! Windows platform backend: WH_KEYBOARD_LL listener with live state queries,
//! SendInput injection.
//!
//! Factory functions return boxed trait objects backed by `HookCapture`
//! (WH_KEYBOARD_LL + GetAsyncKeyState) and `SendInputInjector` (SendInput).

mod capture;
mod injector;
pub mod keycodes;

use std::sync::Arc;

use capture::HookCapture;
use injector::SendInputInjector;

use crate::config::EngineConfig;
use crate::platform::{InputCapture, InputInjector};
use crate::state::KeyStateStore;

/// Returns a `HookCapture`. Key state is live-queried, so `store` is unused.
pub fn create_input_capture(
    _config: &EngineConfig,
    _store: Arc<KeyStateStore>,
) -> Box<dyn InputCapture> {
    Box::new(HookCapture::new())
}

/// Returns a `SendInputInjector`.
pub fn create_input_injector(_config: &EngineConfig) -> Box<dyn InputInjector> {
    Box::new(SendInputInjector::new())
}
