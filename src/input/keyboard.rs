//! Keyboard handling and XKB integration

use std::fs::File;
use std::os::fd::OwnedFd;

use log::{debug, trace};
use memmap2::MmapOptions;
use xkbcommon::xkb;

use super::event::{Key, KeyEvent};
use crate::error::DisplayError;

bitflags::bitflags! {
    /// Modifier flags derived from the current XKB state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const CAPS_LOCK = 1;
        const CONTROL = 2;
    }
}

/// Raw modifier masks as delivered by the compositor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    /// Depressed modifiers (currently held down)
    pub depressed: u32,
    /// Latched modifiers (sticky, cleared on next key)
    pub latched: u32,
    /// Locked modifiers (toggled, like caps lock)
    pub locked: u32,
    /// Keyboard group/layout
    pub group: u32,
}

/// A compiled keymap together with its modifier state
///
/// Implementations own whatever native resources back the keymap; dropping
/// the value releases them.
pub trait KeyResolver {
    /// Keysym produced by an evdev keycode under the current state
    fn keysym(&self, keycode: u32) -> u32;

    /// Unicode code point produced by an evdev keycode, 0 if none
    fn utf32(&self, keycode: u32) -> u32;

    /// Update the modifier state in place
    fn update_modifiers(&mut self, modifiers: ModifierState);

    /// Derived modifier flags
    fn modifiers(&self) -> Modifiers;
}

/// XKB keymap and state pair
///
/// The state holds a reference on its keymap, so both go away together.
pub struct XkbKeymap {
    state: xkb::State,
}

impl XkbKeymap {
    /// Compile a keymap from its text form
    pub fn from_string(context: &xkb::Context, text: String) -> Result<Self, DisplayError> {
        let keymap = xkb::Keymap::new_from_string(
            context,
            text,
            xkb::KEYMAP_FORMAT_TEXT_V1,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        )
        .ok_or_else(|| DisplayError::Keymap("keymap failed to compile".to_string()))?;
        Ok(Self {
            state: xkb::State::new(&keymap),
        })
    }

    /// Map the compositor's keymap descriptor and compile it
    pub fn from_fd(context: &xkb::Context, fd: OwnedFd, size: usize) -> Result<Self, DisplayError> {
        let file = File::from(fd);
        // Never map past the end of the file, touching those pages raises SIGBUS.
        let file_len = file
            .metadata()
            .map_err(|e| DisplayError::Keymap(format!("cannot stat keymap: {e}")))?
            .len();
        let len = usize::try_from(file_len).map_or(size, |file_len| size.min(file_len));
        if len == 0 {
            return Err(DisplayError::Keymap("keymap is empty".to_string()));
        }
        // SAFETY: the mapping is private and read-only, and it is dropped before returning.
        let map = unsafe { MmapOptions::new().len(len).map_copy_read_only(&file) }
            .map_err(|e| DisplayError::Keymap(format!("mmap failed: {e}")))?;

        // The descriptor carries a NUL-terminated string.
        let end = map.iter().position(|&b| b == 0).unwrap_or(map.len());
        let text = std::str::from_utf8(&map[..end])
            .map_err(|e| DisplayError::Keymap(format!("keymap is not UTF-8: {e}")))?;

        Self::from_string(context, text.to_owned())
    }
}

/// XKB keycodes are evdev keycodes offset by 8
fn xkb_keycode(keycode: u32) -> Option<xkb::Keycode> {
    keycode.checked_add(8).map(xkb::Keycode::new)
}

impl KeyResolver for XkbKeymap {
    fn keysym(&self, keycode: u32) -> u32 {
        xkb_keycode(keycode).map_or(0, |code| self.state.key_get_one_sym(code).raw())
    }

    fn utf32(&self, keycode: u32) -> u32 {
        xkb_keycode(keycode).map_or(0, |code| self.state.key_get_utf32(code))
    }

    fn update_modifiers(&mut self, modifiers: ModifierState) {
        self.state.update_mask(
            modifiers.depressed,
            modifiers.latched,
            modifiers.locked,
            0,
            0,
            modifiers.group,
        );
    }

    fn modifiers(&self) -> Modifiers {
        let mut flags = Modifiers::empty();
        if self
            .state
            .mod_name_is_active(&xkb::MOD_NAME_CAPS, xkb::STATE_MODS_EFFECTIVE)
        {
            flags |= Modifiers::CAPS_LOCK;
        }
        if self
            .state
            .mod_name_is_active(&xkb::MOD_NAME_CTRL, xkb::STATE_MODS_EFFECTIVE)
        {
            flags |= Modifiers::CONTROL;
        }
        flags
    }
}

/// Keyboard state
pub struct Keyboard<K = XkbKeymap> {
    /// Active keymap, replaced as a unit
    keymap: Option<K>,
    /// Last modifier masks from the compositor
    modifier_state: ModifierState,
    /// Flags derived from the modifier state
    modifiers: Modifiers,
    /// Repeat rate (characters per second)
    repeat_rate: i32,
    /// Repeat delay (milliseconds)
    repeat_delay: i32,
}

impl<K: KeyResolver> Keyboard<K> {
    /// Create a keyboard without a keymap
    pub fn new() -> Self {
        Self {
            keymap: None,
            modifier_state: ModifierState::default(),
            modifiers: Modifiers::empty(),
            repeat_rate: 25,
            repeat_delay: 600,
        }
    }

    /// Install a new keymap, returning the one it replaces
    ///
    /// The previous keymap is handed back so the caller decides when its
    /// resources go away; dropping the return value releases them.
    pub fn replace_keymap(&mut self, mut keymap: K) -> Option<K> {
        keymap.update_modifiers(self.modifier_state);
        self.modifiers = keymap.modifiers();
        self.keymap.replace(keymap)
    }

    /// Whether a keymap has been installed
    pub fn has_keymap(&self) -> bool {
        self.keymap.is_some()
    }

    /// Translate a key press or release
    pub fn key(&self, keycode: u32, pressed: bool) -> Option<KeyEvent> {
        let keymap = self.keymap.as_ref()?;
        let keysym = keymap.keysym(keycode);
        let Some(key) = Key::from_keysym(keysym) else {
            trace!("Ignoring keysym {:#x} for keycode {}", keysym, keycode);
            return None;
        };
        let code_point = match keymap.utf32(keycode) {
            0 => None,
            cp => char::from_u32(cp),
        };

        debug!("Key {:?} {}", key, if pressed { "pressed" } else { "released" });
        Some(KeyEvent::new(key, pressed, code_point))
    }

    /// Update modifier state
    pub fn update_modifiers(&mut self, modifiers: ModifierState) {
        self.modifier_state = modifiers;
        if let Some(keymap) = self.keymap.as_mut() {
            keymap.update_modifiers(modifiers);
            self.modifiers = keymap.modifiers();
        }
    }

    /// Get derived modifier flags
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Caps lock is active
    pub fn caps_lock(&self) -> bool {
        self.modifiers.contains(Modifiers::CAPS_LOCK)
    }

    /// Control is held
    pub fn control(&self) -> bool {
        self.modifiers.contains(Modifiers::CONTROL)
    }

    /// Set repeat info
    pub fn set_repeat_info(&mut self, rate: i32, delay: i32) {
        self.repeat_rate = rate;
        self.repeat_delay = delay;
    }

    /// Get repeat info
    pub fn repeat_info(&self) -> (i32, i32) {
        (self.repeat_rate, self.repeat_delay)
    }

    /// Drop the keymap
    pub fn clear_keymap(&mut self) {
        self.keymap = None;
    }
}

impl<K: KeyResolver> Default for Keyboard<K> {
    fn default() -> Self {
        Self::new()
    }
}
