//! Observed key state, written by the device-poll capture thread.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::key::Key;

/// Latest known down/up state per key.
///
/// One writer (the capture thread) and any number of readers. Keys that never
/// received an event read as not pressed.
#[derive(Debug, Default)]
pub struct KeyStateStore {
    keys: Mutex<HashMap<Key, bool>>,
}

impl KeyStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: Key, down: bool) {
        self.lock().insert(key, down);
    }

    pub fn get(&self, key: Key) -> bool {
        self.lock().get(&key).copied().unwrap_or(false)
    }

    /// Keys currently down, sorted by code.
    pub fn pressed(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .lock()
            .iter()
            .filter_map(|(&key, &down)| down.then_some(key))
            .collect();
        keys.sort();
        keys
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panicking writer cannot leave a bool map half-updated, so poison is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<Key, bool>> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
