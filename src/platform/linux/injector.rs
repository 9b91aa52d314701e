//! Input injection through a uinput virtual device.
//!
//! `UinputInjector` implements `InputInjector`. `open()` creates a virtual device
//! that can emit every key code in 0..=255, the five mouse buttons and relative
//! X/Y motion. Consumers see it as ordinary hardware.
//!
//! Every event is written as a frame: the event itself followed by `SYN_REPORT`.
//! Without the sync marker consumers keep the event pending. Writes from
//! different threads are serialized so frames never interleave.
//!
//! Required permissions: write access to /dev/uinput (usually root).

use std::io;
use std::sync::{Mutex, MutexGuard};

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId, RelativeAxisType};

use super::keycodes::{to_native_device, BTN_EXTRA, BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, BTN_SIDE};
use crate::config::{EngineConfig, InjectorConfig};
use crate::key::Key;
use crate::platform::{InputInjector, KeyState, PlatformError};

// ---------------------------------------------------------------------------
// Frame sink
// ---------------------------------------------------------------------------

/// Destination for injected events.
pub(crate) trait FrameSink: Send {
    /// Writes `event` followed by one `SYN_REPORT`.
    fn write_frame(&mut self, event: InputEvent) -> io::Result<()>;
}

impl FrameSink for VirtualDevice {
    fn write_frame(&mut self, event: InputEvent) -> io::Result<()> {
        // `emit` terminates the batch with SYN_REPORT.
        self.emit(&[event])
    }
}

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

pub struct UinputInjector {
    settings: InjectorConfig,
    device: Mutex<Option<Box<dyn FrameSink>>>,
}

impl UinputInjector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            settings: config.injector.clone(),
            device: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn with_sink(sink: Box<dyn FrameSink>) -> Self {
        Self {
            settings: InjectorConfig::default(),
            device: Mutex::new(Some(sink)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn FrameSink>>> {
        self.device.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes `events` as consecutive frames while holding the device lock.
    fn write_frames(&self, events: &[InputEvent]) -> Result<(), PlatformError> {
        let mut guard = self.lock();
        let device = guard
            .as_mut()
            .ok_or_else(|| PlatformError::Unavailable("virtual device is not open".into()))?;
        for &event in events {
            device.write_frame(event)?;
        }
        Ok(())
    }
}

impl InputInjector for UinputInjector {
    fn open(&mut self) -> Result<(), PlatformError> {
        let slot = self.device.get_mut().unwrap_or_else(|p| p.into_inner());
        if slot.is_some() {
            return Ok(());
        }

        let device = build_virtual_device(&self.settings).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => PlatformError::PermissionDenied(format!(
                "cannot open /dev/uinput ({e}); run with sudo or grant write access"
            )),
            io::ErrorKind::NotFound => PlatformError::Unavailable(format!(
                "/dev/uinput not found ({e}); is the uinput module loaded?"
            )),
            _ => PlatformError::Io(e),
        })?;

        log::info!(
            "injector: created virtual device {:?}",
            self.settings.device_name
        );
        *slot = Some(Box::new(device));
        Ok(())
    }

    fn close(&mut self) {
        let slot = self.device.get_mut().unwrap_or_else(|p| p.into_inner());
        // Dropping the device closes its fd, which destroys it in the kernel.
        if slot.take().is_some() {
            log::info!("injector: virtual device destroyed");
        }
    }

    fn send_key(&self, key: Key, state: KeyState) -> Result<(), PlatformError> {
        let value = match state {
            KeyState::Down => 1,
            KeyState::Up => 0,
        };
        let code = to_native_device(key);
        self.write_frames(&[InputEvent::new(EventType::KEY, code, value)])?;
        log::debug!("injector: {key:?} {state:?} (evdev {code})");
        Ok(())
    }

    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
        self.write_frames(&[
            InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx),
            InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, dy),
        ])?;
        log::debug!("injector: move ({dx}, {dy})");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Device construction
// ---------------------------------------------------------------------------

fn build_virtual_device(settings: &InjectorConfig) -> io::Result<VirtualDevice> {
    let mut keys = AttributeSet::<evdev::Key>::new();
    for code in 0..=255u16 {
        keys.insert(evdev::Key::new(code));
    }
    for code in [BTN_LEFT, BTN_RIGHT, BTN_MIDDLE, BTN_SIDE, BTN_EXTRA] {
        keys.insert(evdev::Key::new(code));
    }

    let mut axes = AttributeSet::<RelativeAxisType>::new();
    axes.insert(RelativeAxisType::REL_X);
    axes.insert(RelativeAxisType::REL_Y);

    VirtualDeviceBuilder::new()?
        .name(&settings.device_name)
        .input_id(InputId::new(
            BusType::BUS_USB,
            settings.vendor,
            settings.product,
            settings.version,
        ))
        .with_keys(&keys)?
        .with_relative_axes(&axes)?
        .build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    type Written = Arc<Mutex<Vec<(EventType, u16, i32)>>>;

    /// Records what a virtual device would receive, including the sync marker.
    struct RecordingSink {
        written: Written,
        fail: bool,
    }

    impl FrameSink for RecordingSink {
        fn write_frame(&mut self, event: InputEvent) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            let mut written = self.written.lock().unwrap();
            written.push((event.event_type(), event.code(), event.value()));
            written.push((EventType::SYNCHRONIZATION, 0, 0));
            Ok(())
        }
    }

    fn recording() -> (UinputInjector, Written) {
        let written = Written::default();
        let sink = RecordingSink {
            written: Arc::clone(&written),
            fail: false,
        };
        (UinputInjector::with_sink(Box::new(sink)), written)
    }

    const SYN: (EventType, u16, i32) = (EventType::SYNCHRONIZATION, 0, 0);

    #[test]
    fn hold_writes_key_then_sync() {
        let (injector, written) = recording();
        injector.send_key(Key::W, KeyState::Down).unwrap();
        assert_eq!(*written.lock().unwrap(), vec![(EventType::KEY, 17, 1), SYN]);
    }

    #[test]
    fn release_writes_zero_value() {
        let (injector, written) = recording();
        injector.send_key(Key::SPACE, KeyState::Up).unwrap();
        assert_eq!(*written.lock().unwrap(), vec![(EventType::KEY, 57, 0), SYN]);
    }

    #[test]
    fn press_sequence_is_down_then_up() {
        let (injector, written) = recording();
        injector.send_key(Key::SPACE, KeyState::Down).unwrap();
        injector.send_key(Key::SPACE, KeyState::Up).unwrap();
        assert_eq!(
            *written.lock().unwrap(),
            vec![(EventType::KEY, 57, 1), SYN, (EventType::KEY, 57, 0), SYN]
        );
    }

    #[test]
    fn mouse_button_uses_btn_code() {
        let (injector, written) = recording();
        injector.send_key(Key::LMB, KeyState::Down).unwrap();
        assert_eq!(written.lock().unwrap()[0], (EventType::KEY, BTN_LEFT, 1));
    }

    #[test]
    fn move_writes_x_frame_then_y_frame() {
        let (injector, written) = recording();
        injector.move_relative(5, -3).unwrap();
        assert_eq!(
            *written.lock().unwrap(),
            vec![
                (EventType::RELATIVE, RelativeAxisType::REL_X.0, 5),
                SYN,
                (EventType::RELATIVE, RelativeAxisType::REL_Y.0, -3),
                SYN,
            ]
        );
    }

    #[test]
    fn stepped_moves_accumulate_in_order() {
        let (injector, written) = recording();
        for _ in 0..20 {
            injector.move_relative(5, 0).unwrap();
        }
        let written = written.lock().unwrap();
        assert_eq!(written.len(), 80);

        let (mut x, mut y) = (0, 0);
        for &(kind, code, value) in written.iter() {
            if kind == EventType::RELATIVE && code == RelativeAxisType::REL_X.0 {
                x += value;
            } else if kind == EventType::RELATIVE && code == RelativeAxisType::REL_Y.0 {
                y += value;
            }
        }
        assert_eq!((x, y), (100, 0));
    }

    #[test]
    fn closed_injector_reports_unavailable() {
        let injector = UinputInjector::new(&EngineConfig::default());
        let err = injector.send_key(Key::A, KeyState::Down).unwrap_err();
        assert!(matches!(err, PlatformError::Unavailable(_)));
    }

    #[test]
    fn write_failure_is_reported() {
        let sink = RecordingSink {
            written: Written::default(),
            fail: true,
        };
        let injector = UinputInjector::with_sink(Box::new(sink));
        let err = injector.move_relative(1, 1).unwrap_err();
        assert!(matches!(err, PlatformError::Io(_)));
    }

    #[test]
    fn close_releases_device_and_is_idempotent() {
        let (mut injector, _written) = recording();
        injector.close();
        injector.close();
        assert!(injector.send_key(Key::A, KeyState::Down).is_err());
    }

    #[test]
    fn concurrent_frames_do_not_interleave() {
        let (injector, written) = recording();
        let injector = Arc::new(injector);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let injector = Arc::clone(&injector);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        injector.move_relative(1, 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let written = written.lock().unwrap();
        for frame in written.chunks(4) {
            assert_eq!(frame[0].1, RelativeAxisType::REL_X.0);
            assert_eq!(frame[1], SYN);
            assert_eq!(frame[2].1, RelativeAxisType::REL_Y.0);
            assert_eq!(frame[3], SYN);
        }
    }
}
