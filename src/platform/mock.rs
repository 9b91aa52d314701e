//! Recording backends for engine tests. No OS resources are touched.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::key::Key;
use crate::platform::{InputCapture, InputInjector, KeyState, PlatformError, StateSource};
use crate::state::KeyStateStore;

// ---------------------------------------------------------------------------
// MockCapture
// ---------------------------------------------------------------------------

/// Counters shared between a `MockCapture` and the test that owns it.
#[derive(Debug, Default)]
pub struct CaptureProbe {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub running: AtomicBool,
    pub fail_start: AtomicBool,
}

pub struct MockCapture {
    store: Arc<KeyStateStore>,
    probe: Arc<CaptureProbe>,
}

impl MockCapture {
    pub fn new(store: Arc<KeyStateStore>) -> (Self, Arc<CaptureProbe>) {
        let probe = Arc::new(CaptureProbe::default());
        let capture = Self {
            store,
            probe: Arc::clone(&probe),
        };
        (capture, probe)
    }
}

impl InputCapture for MockCapture {
    fn start(&mut self) -> Result<(), PlatformError> {
        if self.probe.fail_start.load(Ordering::SeqCst) {
            return Err(PlatformError::Other("listener refused".into()));
        }
        if !self.probe.running.swap(true, Ordering::SeqCst) {
            self.probe.starts.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        if self.probe.running.swap(false, Ordering::SeqCst) {
            self.probe.stops.fetch_add(1, Ordering::SeqCst);
            self.store.clear();
        }
        Ok(())
    }

    fn source(&self) -> StateSource {
        StateSource::Observed(Arc::clone(&self.store))
    }
}

// ---------------------------------------------------------------------------
// MockInjector
// ---------------------------------------------------------------------------

/// One call observed by `MockInjector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injected {
    Key(Key, KeyState),
    Move(i32, i32),
}

/// Shared view of what a `MockInjector` did.
#[derive(Debug, Default)]
pub struct InjectorProbe {
    pub events: Mutex<Vec<Injected>>,
    pub open: AtomicBool,
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub fail_open: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl InjectorProbe {
    pub fn events(&self) -> Vec<Injected> {
        self.events.lock().unwrap().clone()
    }
}

pub struct MockInjector {
    probe: Arc<InjectorProbe>,
}

impl MockInjector {
    pub fn new() -> (Self, Arc<InjectorProbe>) {
        let probe = Arc::new(InjectorProbe::default());
        (
            Self {
                probe: Arc::clone(&probe),
            },
            probe,
        )
    }

    fn record(&self, event: Injected) -> Result<(), PlatformError> {
        if !self.probe.open.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("not open".into()));
        }
        if self.probe.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
        }
        self.probe.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl InputInjector for MockInjector {
    fn open(&mut self) -> Result<(), PlatformError> {
        if self.probe.fail_open.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied("/dev/uinput".into()));
        }
        if !self.probe.open.swap(true, Ordering::SeqCst) {
            self.probe.opens.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.probe.open.swap(false, Ordering::SeqCst) {
            self.probe.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn send_key(&self, key: Key, state: KeyState) -> Result<(), PlatformError> {
        self.record(Injected::Key(key, state))
    }

    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
        self.record(Injected::Move(dx, dy))
    }
}
