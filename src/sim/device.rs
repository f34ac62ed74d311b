//! Handlers for the devices behind memory-mapped IO.
//!
//! The core types here are:
//! - [`ExternalDevice`]: A device which can be accessed through memory-mapped IO.
//! - [`DeviceHandler`]: The hub which routes memory-mapped addresses to their device.
//!
//! This module also provides the two devices the machine has:
//! - [`Keyboard`]: reads off of an input buffer (and optionally an [`InputSource`]).
//! - [`Display`]: writes to an output buffer.

mod keyboard;
mod display;

pub use keyboard::{ChannelInput, InputSource, Keyboard};
pub use display::Display;

/// Keyboard status register. Bit 15 is set when a character is available.
pub const KBSR: u16 = 0xFE00;
/// Keyboard data register. Reading it consumes the next character.
pub const KBDR: u16 = 0xFE02;
/// Display status register. Bit 15 is set when the display is ready.
pub const DSR:  u16 = 0xFE04;
/// Display data register. Writing it prints the low byte.
pub const DDR:  u16 = 0xFE06;

/// A device which can be accessed via memory-mapped IO.
pub trait ExternalDevice {
    /// Reads the data at the given memory-mapped address.
    ///
    /// If this device handles the address, this returns the value read.
    /// Otherwise, this returns `None`.
    fn io_read(&mut self, addr: u16) -> Option<u16>;

    /// Writes the data to the given memory-mapped address.
    ///
    /// This returns whether this device handled the write.
    fn io_write(&mut self, addr: u16, data: u16) -> bool;

    /// Resets the device's buffered state.
    fn io_reset(&mut self);
}

/// The central hub for the devices of the Simulator.
///
/// This routes the keyboard registers ([`KBSR`], [`KBDR`]) to the keyboard
/// and the display registers ([`DSR`], [`DDR`]) to the display.
#[derive(Debug, Default)]
pub struct DeviceHandler {
    /// The keyboard.
    pub keyboard: Keyboard,
    /// The display.
    pub display: Display
}

impl DeviceHandler {
    /// Creates a new device handler with an empty keyboard and display.
    pub fn new() -> Self {
        Self::default()
    }

    fn device_at(&mut self, addr: u16) -> Option<&mut dyn ExternalDevice> {
        match addr {
            KBSR | KBDR => Some(&mut self.keyboard),
            DSR  | DDR  => Some(&mut self.display),
            _ => None
        }
    }

    /// Reads a memory-mapped address, returning `None` if no device is bound to it.
    pub fn io_read(&mut self, addr: u16) -> Option<u16> {
        self.device_at(addr)?.io_read(addr)
    }

    /// Writes to a memory-mapped address,
    /// returning whether a device accepted the write.
    pub fn io_write(&mut self, addr: u16, data: u16) -> bool {
        self.device_at(addr)
            .is_some_and(|dev| dev.io_write(addr, data))
    }

    /// Resets all devices.
    pub fn io_reset(&mut self) {
        self.keyboard.io_reset();
        self.display.io_reset();
    }
}
