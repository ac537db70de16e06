//! Seat capability tracking

use wayland_client::protocol::wl_seat;
use wayland_client::WEnum;

/// Seat capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeatCapabilities {
    pub keyboard: bool,
    pub pointer: bool,
}

/// What happened to one input device after a capability update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceChange {
    Added,
    Removed,
    Unchanged,
}

impl DeviceChange {
    fn between(old: bool, new: bool) -> Self {
        match (old, new) {
            (false, true) => DeviceChange::Added,
            (true, false) => DeviceChange::Removed,
            _ => DeviceChange::Unchanged,
        }
    }
}

/// Device changes implied by a capability update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatChanges {
    pub keyboard: DeviceChange,
    pub pointer: DeviceChange,
}

impl SeatCapabilities {
    /// Convert from the protocol capability flags
    pub fn from_wayland(capabilities: WEnum<wl_seat::Capability>) -> Self {
        let caps = match capabilities {
            WEnum::Value(caps) => caps,
            WEnum::Unknown(raw) => wl_seat::Capability::from_bits_truncate(raw),
        };
        Self {
            pointer: caps.contains(wl_seat::Capability::Pointer),
            keyboard: caps.contains(wl_seat::Capability::Keyboard),
        }
    }

    /// Changes needed to go from `self` to `new`
    pub fn changes(&self, new: SeatCapabilities) -> SeatChanges {
        SeatChanges {
            keyboard: DeviceChange::between(self.keyboard, new.keyboard),
            pointer: DeviceChange::between(self.pointer, new.pointer),
        }
    }
}
