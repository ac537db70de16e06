//! Application-level key events

use xkbcommon::xkb::keysyms;

/// Keys the application reacts to
///
/// Anything outside this set produces no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    F1,
    F2,
    F3,
    F4,
    F8,
    Space,
    Left,
    Right,
    Up,
    Down,
    Escape,
    /// A letter key, always lowercase
    Char(char),
}

impl Key {
    /// Map an XKB keysym to a key
    pub fn from_keysym(keysym: u32) -> Option<Self> {
        let key = match keysym {
            keysyms::KEY_F1 => Key::F1,
            keysyms::KEY_F2 => Key::F2,
            keysyms::KEY_F3 => Key::F3,
            keysyms::KEY_F4 => Key::F4,
            keysyms::KEY_F8 => Key::F8,
            keysyms::KEY_space => Key::Space,
            keysyms::KEY_Left => Key::Left,
            keysyms::KEY_Right => Key::Right,
            keysyms::KEY_Up => Key::Up,
            keysyms::KEY_Down => Key::Down,
            keysyms::KEY_Escape => Key::Escape,
            keysyms::KEY_a..=keysyms::KEY_z => Key::Char(char::from_u32(keysym)?),
            keysyms::KEY_A..=keysyms::KEY_Z => {
                Key::Char(char::from_u32(keysym)?.to_ascii_lowercase())
            }
            _ => return None,
        };
        Some(key)
    }
}

/// A key press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Symbolic key
    pub key: Key,
    /// True on press, false on release
    pub pressed: bool,
    /// Unicode text produced by the key, if any
    pub code_point: Option<char>,
}

impl KeyEvent {
    pub fn new(key: Key, pressed: bool, code_point: Option<char>) -> Self {
        Self {
            key,
            pressed,
            code_point,
        }
    }
}
