//! Windows virtual key helpers.
//!
//! `Key` values already use Windows virtual-key numbering, so the keyboard
//! direction is the identity. What remains is the flag work `SendInput` needs:
//!
//! - `is_extended`: navigation keys and right-hand modifiers need
//!   `KEYEVENTF_EXTENDEDKEY` (0x0001) or they arrive as their numpad twins.
//! - `mouse_button`: VK_LBUTTON and friends cannot be injected as keyboard
//!   events; they map to `MOUSEINPUT` button flags instead.

use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP,
    MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP,
};

use crate::key::Key;

/// `KEYEVENTF_EXTENDEDKEY`.
pub const EXTENDED: u32 = 0x0001;

/// `dwExtraInfo` tag on every event we inject, checked by the hook.
pub const INJECTED_MARKER: usize = 0x4349_4E50;

// `mouseData` selectors for MOUSEEVENTF_XDOWN / MOUSEEVENTF_XUP.
const XBUTTON1: i32 = 0x0001;
const XBUTTON2: i32 = 0x0002;

/// `SendInput` flags for one mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonFlags {
    pub down: u32,
    pub up: u32,
    /// `MOUSEINPUT.mouseData`; selects the X button.
    pub data: i32,
}

pub fn to_vk(key: Key) -> u16 {
    key.code()
}

pub fn is_extended(key: Key) -> bool {
    matches!(
        key,
        Key::LEFT
            | Key::UP
            | Key::RIGHT
            | Key::DOWN
            | Key::INSERT
            | Key::DELETE
            | Key::RCTRL
            | Key::RALT
    ) || matches!(key.code(), 0x21..=0x24 | 0x5B | 0x5C)
}

pub fn mouse_button(key: Key) -> Option<MouseButtonFlags> {
    let (down, up, data) = match key {
        Key::LMB => (MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, 0),
        Key::RMB => (MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, 0),
        Key::MMB => (MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, 0),
        Key::MOUSE4 => (MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP, XBUTTON1),
        Key::MOUSE5 => (MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP, XBUTTON2),
        _ => return None,
    };
    Some(MouseButtonFlags { down, up, data })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
