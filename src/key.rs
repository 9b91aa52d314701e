//! Platform-neutral key identity.
//!
//! `Key` numbers every key and mouse button with the hook/query backend's native
//! code (Windows virtual-key numbering). The device backend translates through
//! `platform::linux::keycodes`. Codes outside the named set are still valid
//! `Key` values: unmapped device codes pass through as-is.

use std::fmt;

/// One physical key or mouse button.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(u16);

impl Key {
    // Letters
    pub const A: Key = Key(0x41);
    pub const B: Key = Key(0x42);
    pub const C: Key = Key(0x43);
    pub const D: Key = Key(0x44);
    pub const E: Key = Key(0x45);
    pub const F: Key = Key(0x46);
    pub const G: Key = Key(0x47);
    pub const H: Key = Key(0x48);
    pub const I: Key = Key(0x49);
    pub const J: Key = Key(0x4A);
    pub const K: Key = Key(0x4B);
    pub const L: Key = Key(0x4C);
    pub const M: Key = Key(0x4D);
    pub const N: Key = Key(0x4E);
    pub const O: Key = Key(0x4F);
    pub const P: Key = Key(0x50);
    pub const Q: Key = Key(0x51);
    pub const R: Key = Key(0x52);
    pub const S: Key = Key(0x53);
    pub const T: Key = Key(0x54);
    pub const U: Key = Key(0x55);
    pub const V: Key = Key(0x56);
    pub const W: Key = Key(0x57);
    pub const X: Key = Key(0x58);
    pub const Y: Key = Key(0x59);
    pub const Z: Key = Key(0x5A);

    // Top-row digits
    pub const NUM0: Key = Key(0x30);
    pub const NUM1: Key = Key(0x31);
    pub const NUM2: Key = Key(0x32);
    pub const NUM3: Key = Key(0x33);
    pub const NUM4: Key = Key(0x34);
    pub const NUM5: Key = Key(0x35);
    pub const NUM6: Key = Key(0x36);
    pub const NUM7: Key = Key(0x37);
    pub const NUM8: Key = Key(0x38);
    pub const NUM9: Key = Key(0x39);

    // Function keys
    pub const F1: Key = Key(0x70);
    pub const F2: Key = Key(0x71);
    pub const F3: Key = Key(0x72);
    pub const F4: Key = Key(0x73);
    pub const F5: Key = Key(0x74);
    pub const F6: Key = Key(0x75);
    pub const F7: Key = Key(0x76);
    pub const F8: Key = Key(0x77);
    pub const F9: Key = Key(0x78);
    pub const F10: Key = Key(0x79);
    pub const F11: Key = Key(0x7A);
    pub const F12: Key = Key(0x7B);

    // Editing and whitespace
    pub const SPACE: Key = Key(0x20);
    pub const ENTER: Key = Key(0x0D);
    pub const TAB: Key = Key(0x09);
    pub const ESCAPE: Key = Key(0x1B);
    pub const BACKSPACE: Key = Key(0x08);
    pub const DELETE: Key = Key(0x2E);
    pub const INSERT: Key = Key(0x2D);

    // Modifiers (sided)
    pub const LSHIFT: Key = Key(0xA0);
    pub const RSHIFT: Key = Key(0xA1);
    pub const LCTRL: Key = Key(0xA2);
    pub const RCTRL: Key = Key(0xA3);
    pub const LALT: Key = Key(0xA4);
    pub const RALT: Key = Key(0xA5);

    // Arrows
    pub const LEFT: Key = Key(0x25);
    pub const UP: Key = Key(0x26);
    pub const RIGHT: Key = Key(0x27);
    pub const DOWN: Key = Key(0x28);

    // Mouse buttons
    pub const LMB: Key = Key(0x01);
    pub const RMB: Key = Key(0x02);
    pub const MMB: Key = Key(0x04);
    pub const MOUSE4: Key = Key(0x05);
    pub const MOUSE5: Key = Key(0x06);

    // Brackets
    pub const LEFT_BRACKET: Key = Key(0xDB);
    pub const RIGHT_BRACKET: Key = Key(0xDD);

    /// Every named key, in declaration order.
    pub const ALL: &'static [Key] = &[
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
        Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
        Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
        Key::NUM0, Key::NUM1, Key::NUM2, Key::NUM3, Key::NUM4,
        Key::NUM5, Key::NUM6, Key::NUM7, Key::NUM8, Key::NUM9,
        Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
        Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
        Key::SPACE, Key::ENTER, Key::TAB, Key::ESCAPE,
        Key::BACKSPACE, Key::DELETE, Key::INSERT,
        Key::LSHIFT, Key::RSHIFT, Key::LCTRL, Key::RCTRL, Key::LALT, Key::RALT,
        Key::LEFT, Key::UP, Key::RIGHT, Key::DOWN,
        Key::LMB, Key::RMB, Key::MMB, Key::MOUSE4, Key::MOUSE5,
        Key::LEFT_BRACKET, Key::RIGHT_BRACKET,
    ];

    /// Wraps a raw code. Any value is accepted; unnamed codes simply have no name.
    pub const fn from_code(code: u16) -> Key {
        Key(code)
    }

    /// The raw code, which is also the hook/query backend's native code.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// True for the five mouse-button identities.
    pub fn is_mouse_button(self) -> bool {
        matches!(self, Key::LMB | Key::RMB | Key::MMB | Key::MOUSE4 | Key::MOUSE5)
    }

    /// Human-readable name, or `"Unknown"`.
    pub fn name(self) -> &'static str {
        key_name(self)
    }
}

/// Human-readable name for `key`, or `"Unknown"` for codes with no entry.
pub fn key_name(key: Key) -> &'static str {
    match key {
        Key::A => "A",
        Key::B => "B",
        Key::C => "C",
        Key::D => "D",
        Key::E => "E",
        Key::F => "F",
        Key::G => "G",
        Key::H => "H",
        Key::I => "I",
        Key::J => "J",
        Key::K => "K",
        Key::L => "L",
        Key::M => "M",
        Key::N => "N",
        Key::O => "O",
        Key::P => "P",
        Key::Q => "Q",
        Key::R => "R",
        Key::S => "S",
        Key::T => "T",
        Key::U => "U",
        Key::V => "V",
        Key::W => "W",
        Key::X => "X",
        Key::Y => "Y",
        Key::Z => "Z",
        Key::NUM0 => "0",
        Key::NUM1 => "1",
        Key::NUM2 => "2",
        Key::NUM3 => "3",
        Key::NUM4 => "4",
        Key::NUM5 => "5",
        Key::NUM6 => "6",
        Key::NUM7 => "7",
        Key::NUM8 => "8",
        Key::NUM9 => "9",
        Key::F1 => "F1",
        Key::F2 => "F2",
        Key::F3 => "F3",
        Key::F4 => "F4",
        Key::F5 => "F5",
        Key::F6 => "F6",
        Key::F7 => "F7",
        Key::F8 => "F8",
        Key::F9 => "F9",
        Key::F10 => "F10",
        Key::F11 => "F11",
        Key::F12 => "F12",
        Key::SPACE => "Space",
        Key::ENTER => "Enter",
        Key::TAB => "Tab",
        Key::ESCAPE => "Escape",
        Key::BACKSPACE => "Backspace",
        Key::DELETE => "Delete",
        Key::INSERT => "Insert",
        Key::LSHIFT => "LShift",
        Key::RSHIFT => "RShift",
        Key::LCTRL => "LCtrl",
        Key::RCTRL => "RCtrl",
        Key::LALT => "LAlt",
        Key::RALT => "RAlt",
        Key::LEFT => "Left",
        Key::UP => "Up",
        Key::RIGHT => "Right",
        Key::DOWN => "Down",
        Key::LMB => "LMB",
        Key::RMB => "RMB",
        Key::MMB => "MMB",
        Key::MOUSE4 => "Mouse4",
        Key::MOUSE5 => "Mouse5",
        Key::LEFT_BRACKET => "[",
        Key::RIGHT_BRACKET => "]",
        _ => "Unknown",
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match key_name(*self) {
            "Unknown" => write!(f, "Key({:#04x})", self.0),
            name => f.write_str(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn known_names() {
        assert_eq!(key_name(Key::A), "A");
        assert_eq!(Key::SPACE.name(), "Space");
        assert_eq!(Key::LEFT_BRACKET.name(), "[");
        assert_eq!(Key::LMB.name(), "LMB");
    }

    #[test]
    fn unregistered_key_is_unknown() {
        assert_eq!(key_name(Key::from_code(0xFF)), "Unknown");
        assert_eq!(key_name(Key::from_code(0x1234)), "Unknown");
    }

    #[test]
    fn every_named_key_has_a_name() {
        for &key in Key::ALL {
            assert_ne!(key.name(), "Unknown", "{:#04x} has no name", key.code());
        }
    }

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<u16> = Key::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), Key::ALL.len());
    }

    #[test]
    fn codes_match_virtual_key_numbering() {
        assert_eq!(Key::A.code(), 0x41);
        assert_eq!(Key::NUM0.code(), 0x30);
        assert_eq!(Key::F12.code(), 0x7B);
        assert_eq!(Key::ESCAPE.code(), 0x1B);
        assert_eq!(Key::RALT.code(), 0xA5);
        assert_eq!(Key::MOUSE5.code(), 0x06);
    }

    #[test]
    fn from_code_round_trips() {
        assert_eq!(Key::from_code(0x57), Key::W);
        assert_eq!(Key::from_code(999).code(), 999);
    }

    #[test]
    fn debug_uses_name_or_hex() {
        assert_eq!(format!("{:?}", Key::W), "W");
        assert_eq!(format!("{}", Key::from_code(0xFF)), "Key(0xff)");
    }

    #[test]
    fn ordering_follows_code() {
        assert!(Key::LMB < Key::A);
        assert!(Key::A < Key::LSHIFT);
    }

    #[test]
    fn mouse_buttons_are_flagged() {
        assert!(Key::LMB.is_mouse_button());
        assert!(Key::MOUSE5.is_mouse_button());
        assert!(!Key::A.is_mouse_button());
        // 0x03 is VK_CANCEL, not a button.
        assert!(!Key::from_code(0x03).is_mouse_button());
    }
}
