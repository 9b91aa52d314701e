//! Key state capture by polling the Linux evdev interface (/dev/input/event*).
//!
//! `DevicePollCapture` implements the `InputCapture` trait. `start()` opens every
//! `event*` node under the configured directory in non-blocking mode, then spawns
//! a background thread that drains all devices once per poll interval and writes
//! key transitions into the shared `KeyStateStore`.
//!
//! Capture is best-effort: an unreadable directory or device only narrows what
//! is observed. Reading devices usually requires membership in the `input`
//! group (or root).

use std::fs;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use evdev::{Device, EventType, InputEvent};
use nix::fcntl::{fcntl, FcntlArg, OFlag};

use super::keycodes::from_native_device;
use crate::config::EngineConfig;
use crate::platform::{InputCapture, PlatformError, StateSource};
use crate::state::KeyStateStore;

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Linux capture backend reading raw evdev events.
pub struct DevicePollCapture {
    device_dir: PathBuf,
    poll_interval: Duration,
    /// Device name to leave unopened (our own uinput device).
    skip_name: Option<String>,
    store: Arc<KeyStateStore>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl DevicePollCapture {
    pub fn new(config: &EngineConfig, store: Arc<KeyStateStore>) -> Self {
        let skip_name = (!config.capture.observe_injected)
            .then(|| config.injector.device_name.clone());
        Self {
            device_dir: config.capture.device_dir.clone(),
            poll_interval: Duration::from_millis(config.capture.poll_interval_ms),
            skip_name,
            store,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl InputCapture for DevicePollCapture {
    fn start(&mut self) -> Result<(), PlatformError> {
        if self.thread.is_some() {
            return Ok(());
        }

        // Open devices in the calling thread so the count is logged before
        // `start()` returns.
        let devices = open_devices(&self.device_dir, self.skip_name.as_deref());
        if devices.is_empty() {
            log::warn!(
                "capture: no readable devices in {}; key state will not update. \
                 Run as root or add this user to the 'input' group.",
                self.device_dir.display()
            );
        } else {
            log::info!("capture: opened {} device(s)", devices.len());
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let store = Arc::clone(&self.store);
        let interval = self.poll_interval;

        let spawned = thread::Builder::new()
            .name("crossinput-capture".into())
            .spawn(move || poll_loop(devices, &store, &running, interval));

        match spawned {
            Ok(thread) => {
                self.thread = Some(thread);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(PlatformError::Io(e))
            }
        }
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        self.running.store(false, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        let joined = thread.join();
        self.store.clear();
        joined.map_err(|_| PlatformError::Other("capture thread panicked".into()))
    }

    fn source(&self) -> StateSource {
        StateSource::Observed(Arc::clone(&self.store))
    }
}

impl Drop for DevicePollCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ---------------------------------------------------------------------------
// Device enumeration
// ---------------------------------------------------------------------------

/// Opens every `event*` node in `dir`, skipping any that fail.
fn open_devices(dir: &Path, skip_name: Option<&str>) -> Vec<Device> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("capture: cannot enumerate {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_event_node(path))
        .collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|path| open_device(path, skip_name))
        .collect()
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("event"))
}

fn open_device(path: &Path, skip_name: Option<&str>) -> Option<Device> {
    let device = match Device::open(path) {
        Ok(device) => device,
        Err(e) => {
            log::debug!("capture: skipping {}: {e}", path.display());
            return None;
        }
    };

    if skip_name.is_some() && device.name() == skip_name {
        log::debug!("capture: skipping own virtual device {}", path.display());
        return None;
    }

    if let Err(e) = set_nonblocking(device.as_raw_fd()) {
        log::debug!("capture: skipping {}: cannot set O_NONBLOCK: {e}", path.display());
        return None;
    }

    log::debug!(
        "capture: monitoring {} ({})",
        path.display(),
        device.name().unwrap_or("unnamed")
    );
    Some(device)
}

fn set_nonblocking(fd: RawFd) -> nix::Result<()> {
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

/// Runs on the capture thread. Owns the devices; they close when it returns.
fn poll_loop(
    mut devices: Vec<Device>,
    store: &KeyStateStore,
    running: &AtomicBool,
    interval: Duration,
) {
    log::info!("capture: device polling active");

    while running.load(Ordering::Acquire) {
        devices.retain_mut(|device| drain_device(device, store));
        thread::sleep(interval);
    }

    log::info!(
        "capture: stop signal received, closing {} device(s)",
        devices.len()
    );
}

/// Applies every pending event from `device`. Returns `false` when the device
/// failed hard and should be dropped.
fn drain_device(device: &mut Device, store: &KeyStateStore) -> bool {
    let err = match device.fetch_events() {
        Ok(events) => {
            for event in events {
                apply_event(store, &event);
            }
            return true;
        }
        Err(e) => e,
    };

    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    log::warn!(
        "capture: dropping device {}: {err}",
        device.name().unwrap_or("unnamed")
    );
    false
}

/// Records a key transition. Non-key events are ignored; auto-repeat (value 2)
/// counts as down.
fn apply_event(store: &KeyStateStore, event: &InputEvent) {
    if event.event_type() != EventType::KEY {
        return;
    }
    let key = from_native_device(event.code());
    let down = event.value() != 0;
    log::trace!("capture: {key:?} {}", if down { "down" } else { "up" });
    store.set(key, down);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use std::time::Instant;

    fn key_event(code: u16, value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY, code, value)
    }

    fn config_for(dir: &Path) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.capture.device_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn key_down_then_up_updates_store() {
        let store = KeyStateStore::new();
        apply_event(&store, &key_event(17, 1));
        assert!(store.get(Key::W));
        apply_event(&store, &key_event(17, 0));
        assert!(!store.get(Key::W));
    }

    #[test]
    fn auto_repeat_counts_as_down() {
        let store = KeyStateStore::new();
        apply_event(&store, &key_event(57, 2));
        assert!(store.get(Key::SPACE));
    }

    #[test]
    fn non_key_events_are_ignored() {
        let store = KeyStateStore::new();
        apply_event(&store, &InputEvent::new(EventType::RELATIVE, 0, 5));
        apply_event(&store, &InputEvent::new(EventType::SYNCHRONIZATION, 0, 0));
        assert!(store.pressed().is_empty());
    }

    #[test]
    fn unmapped_code_is_stored_under_raw_key() {
        let store = KeyStateStore::new();
        apply_event(&store, &key_event(183, 1));
        assert!(store.get(Key::from_code(183)));
    }

    #[test]
    fn event_node_filter() {
        assert!(is_event_node(Path::new("/dev/input/event3")));
        assert!(!is_event_node(Path::new("/dev/input/mouse0")));
        assert!(!is_event_node(Path::new("/dev/input/by-id")));
    }

    #[test]
    fn missing_directory_yields_no_devices() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_devices(&dir.path().join("absent"), None).is_empty());
    }

    #[test]
    fn non_device_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("event0"), b"not a device").unwrap();
        fs::write(dir.path().join("mice"), b"").unwrap();
        assert!(open_devices(dir.path(), None).is_empty());
    }

    #[test]
    fn new_produces_idle_state() {
        let capture = DevicePollCapture::new(&EngineConfig::default(), Arc::default());
        assert!(capture.thread.is_none());
        assert!(!capture.running.load(Ordering::Acquire));
        assert_eq!(capture.skip_name.as_deref(), Some("CrossInput Virtual Device"));
    }

    #[test]
    fn observe_injected_disables_self_skip() {
        let mut config = EngineConfig::default();
        config.capture.observe_injected = true;
        let capture = DevicePollCapture::new(&config, Arc::default());
        assert!(capture.skip_name.is_none());
    }

    #[test]
    fn stop_on_unstarted_capture_is_noop() {
        let mut capture = DevicePollCapture::new(&EngineConfig::default(), Arc::default());
        assert!(capture.stop().is_ok());
        assert!(capture.stop().is_ok());
    }

    #[test]
    fn start_without_devices_still_runs_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(KeyStateStore::new());
        let mut capture = DevicePollCapture::new(&config_for(dir.path()), Arc::clone(&store));

        capture.start().unwrap();
        assert!(capture.thread.is_some());

        let started = Instant::now();
        capture.stop().unwrap();
        assert!(capture.thread.is_none());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn second_start_keeps_the_same_thread() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = DevicePollCapture::new(&config_for(dir.path()), Arc::default());

        capture.start().unwrap();
        let first = capture.thread.as_ref().map(|t| t.thread().id());
        capture.start().unwrap();
        let second = capture.thread.as_ref().map(|t| t.thread().id());
        assert_eq!(first, second);

        capture.stop().unwrap();
    }

    #[test]
    fn stop_clears_observed_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(KeyStateStore::new());
        let mut capture = DevicePollCapture::new(&config_for(dir.path()), Arc::clone(&store));

        capture.start().unwrap();
        store.set(Key::A, true);
        capture.stop().unwrap();
        assert!(!store.get(Key::A));
    }

    #[test]
    fn source_reads_shared_store() {
        let store = Arc::new(KeyStateStore::new());
        let capture = DevicePollCapture::new(&EngineConfig::default(), Arc::clone(&store));
        store.set(Key::LCTRL, true);
        assert!(capture.source().is_pressed(Key::LCTRL));
    }
}
