//! Input handling module
//!
//! Translates compositor keyboard and pointer callbacks into application
//! key events, and tracks keymap, modifier and seat state.

pub mod event;
pub mod keyboard;
pub mod pointer;
pub mod seat;

pub use event::{Key, KeyEvent};
pub use keyboard::{KeyResolver, Keyboard, ModifierState, Modifiers, XkbKeymap};
pub use pointer::Pointer;
pub use seat::{DeviceChange, SeatCapabilities, SeatChanges};
