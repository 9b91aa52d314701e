//! Fallback for targets with neither backend. Every acquisition fails.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::key::Key;
use crate::platform::{InputCapture, InputInjector, KeyState, PlatformError, StateSource};
use crate::state::KeyStateStore;

const REASON: &str = "only Linux and Windows are supported";

pub fn create_input_capture(
    _config: &EngineConfig,
    store: Arc<KeyStateStore>,
) -> Box<dyn InputCapture> {
    Box::new(UnsupportedCapture { store })
}

pub fn create_input_injector(_config: &EngineConfig) -> Box<dyn InputInjector> {
    Box::new(UnsupportedInjector)
}

struct UnsupportedCapture {
    store: Arc<KeyStateStore>,
}

impl InputCapture for UnsupportedCapture {
    fn start(&mut self) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(REASON.into()))
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn source(&self) -> StateSource {
        StateSource::Observed(Arc::clone(&self.store))
    }
}

struct UnsupportedInjector;

impl InputInjector for UnsupportedInjector {
    fn open(&mut self) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(REASON.into()))
    }

    fn close(&mut self) {}

    fn send_key(&self, _key: Key, _state: KeyState) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(REASON.into()))
    }

    fn move_relative(&self, _dx: i32, _dy: i32) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(REASON.into()))
    }
}
