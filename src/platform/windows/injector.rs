//! Windows input injection via SendInput.
//!
//! `SendInputInjector` implements `InputInjector`. Injection is synchronous:
//! `SendInput` returns after the event is queued, and the call is safe from
//! any thread, so no resource or lock is held between calls.
//!
//! Every event carries `INJECTED_MARKER` in `dwExtraInfo` so the capture hook
//! can recognize and ignore it.

use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_KEYUP,
    MOUSEEVENTF_MOVE, MOUSEINPUT,
};

use super::keycodes::{is_extended, mouse_button, to_vk, EXTENDED, INJECTED_MARKER};
use crate::key::Key;
use crate::platform::{InputInjector, KeyState, PlatformError};

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Stateless: each call builds one `INPUT` record and submits it.
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        SendInputInjector
    }
}

// ---------------------------------------------------------------------------
// InputInjector trait impl
// ---------------------------------------------------------------------------

impl InputInjector for SendInputInjector {
    fn open(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn close(&mut self) {}

    fn send_key(&self, key: Key, state: KeyState) -> Result<(), PlatformError> {
        let input = match mouse_button(key) {
            Some(flags) => {
                let dw_flags = match state {
                    KeyState::Down => flags.down,
                    KeyState::Up => flags.up,
                };
                mouse_input(0, 0, flags.data, dw_flags)
            }
            None => keyboard_input(key, state),
        };

        submit(&input)?;
        log::debug!("injector: {key:?} {state:?}");
        Ok(())
    }

    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), PlatformError> {
        submit(&mouse_input(dx, dy, 0, MOUSEEVENTF_MOVE))?;
        log::debug!("injector: move ({dx}, {dy})");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// INPUT construction
// ---------------------------------------------------------------------------

fn keyboard_input(key: Key, state: KeyState) -> INPUT {
    let mut dw_flags = if is_extended(key) { EXTENDED } else { 0 };
    if state == KeyState::Up {
        dw_flags |= KEYEVENTF_KEYUP;
    }

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: to_vk(key),
                wScan: 0,
                dwFlags: dw_flags,
                time: 0,
                dwExtraInfo: INJECTED_MARKER,
            },
        },
    }
}

fn mouse_input(dx: i32, dy: i32, data: i32, dw_flags: u32) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: data,
                dwFlags: dw_flags,
                time: 0,
                dwExtraInfo: INJECTED_MARKER,
            },
        },
    }
}

fn submit(input: &INPUT) -> Result<(), PlatformError> {
    let sent = unsafe { SendInput(1, input, std::mem::size_of::<INPUT>() as i32) };
    if sent == 0 {
        return Err(PlatformError::Other(format!(
            "SendInput rejected the event: {}",
            std::io::Error::last_os_error()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
