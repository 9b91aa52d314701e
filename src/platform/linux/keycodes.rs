//! Linux evdev keycode conversions.
//!
//! Maps `Key` (virtual-key numbering) to and from the codes in
//! `linux/input-event-codes.h`, as read from `/dev/input/event*` and written to
//! the uinput device.
//!
//! - `to_native_device`: for outgoing injection.
//! - `from_native_device`: for incoming capture events.
//!
//! Both directions are total. A code missing from the table passes through
//! numerically unchanged; this keeps unmapped hardware keys observable under a
//! stable (if unnamed) `Key`.

use crate::key::Key;

/// `EV_KEY` codes for the mouse buttons.
pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;
pub const BTN_SIDE: u16 = 0x113;
pub const BTN_EXTRA: u16 = 0x114;

/// Every named key with its evdev code. Both columns are unique.
const DEVICE_CODES: &[(Key, u16)] = &[
    // Letters
    (Key::A, 30),
    (Key::B, 48),
    (Key::C, 46),
    (Key::D, 32),
    (Key::E, 18),
    (Key::F, 33),
    (Key::G, 34),
    (Key::H, 35),
    (Key::I, 23),
    (Key::J, 36),
    (Key::K, 37),
    (Key::L, 38),
    (Key::M, 50),
    (Key::N, 49),
    (Key::O, 24),
    (Key::P, 25),
    (Key::Q, 16),
    (Key::R, 19),
    (Key::S, 31),
    (Key::T, 20),
    (Key::U, 22),
    (Key::V, 47),
    (Key::W, 17),
    (Key::X, 45),
    (Key::Y, 21),
    (Key::Z, 44),
    // Top-row digits (2–11 = 1–0)
    (Key::NUM1, 2),
    (Key::NUM2, 3),
    (Key::NUM3, 4),
    (Key::NUM4, 5),
    (Key::NUM5, 6),
    (Key::NUM6, 7),
    (Key::NUM7, 8),
    (Key::NUM8, 9),
    (Key::NUM9, 10),
    (Key::NUM0, 11),
    // Function keys; F11/F12 are not contiguous with F1–F10.
    (Key::F1, 59),
    (Key::F2, 60),
    (Key::F3, 61),
    (Key::F4, 62),
    (Key::F5, 63),
    (Key::F6, 64),
    (Key::F7, 65),
    (Key::F8, 66),
    (Key::F9, 67),
    (Key::F10, 68),
    (Key::F11, 87),
    (Key::F12, 88),
    // Editing and whitespace
    (Key::SPACE, 57),
    (Key::ENTER, 28),
    (Key::TAB, 15),
    (Key::ESCAPE, 1),
    (Key::BACKSPACE, 14),
    (Key::DELETE, 111),
    (Key::INSERT, 110),
    // Modifiers
    (Key::LSHIFT, 42),
    (Key::RSHIFT, 54),
    (Key::LCTRL, 29),
    (Key::RCTRL, 97),
    (Key::LALT, 56),
    (Key::RALT, 100),
    // Arrows
    (Key::LEFT, 105),
    (Key::UP, 103),
    (Key::RIGHT, 106),
    (Key::DOWN, 108),
    // Mouse buttons
    (Key::LMB, BTN_LEFT),
    (Key::RMB, BTN_RIGHT),
    (Key::MMB, BTN_MIDDLE),
    (Key::MOUSE4, BTN_SIDE),
    (Key::MOUSE5, BTN_EXTRA),
    // Brackets
    (Key::LEFT_BRACKET, 26),
    (Key::RIGHT_BRACKET, 27),
];

// ---------------------------------------------------------------------------
// Injection side: Key → evdev code
// ---------------------------------------------------------------------------

pub fn to_native_device(key: Key) -> u16 {
    DEVICE_CODES
        .iter()
        .find(|&&(k, _)| k == key)
        .map_or(key.code(), |&(_, code)| code)
}

// ---------------------------------------------------------------------------
// Capture side: evdev code → Key
// ---------------------------------------------------------------------------

pub fn from_native_device(code: u16) -> Key {
    DEVICE_CODES
        .iter()
        .find(|&&(_, c)| c == code)
        .map_or(Key::from_code(code), |&(key, _)| key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
