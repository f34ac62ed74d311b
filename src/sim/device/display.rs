use super::{ExternalDevice, DDR, DSR};

/// The display (console output).
///
/// Every byte written to it is appended to its output as one character.
#[derive(Debug, Default, Clone)]
pub struct Display {
    output: String
}
impl Display {
    /// Appends one character to the output.
    ///
    /// Bytes are mapped to characters one-to-one (as Latin-1).
    pub fn send_output(&mut self, byte: u8) {
        self.output.push(char::from(byte));
    }

    /// Everything printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Takes everything printed so far, leaving the output empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
impl ExternalDevice for Display {
    fn io_read(&mut self, addr: u16) -> Option<u16> {
        match addr {
            // always ready
            DSR => Some(0x8000),
            _   => None
        }
    }

    fn io_write(&mut self, addr: u16, data: u16) -> bool {
        match addr {
            DDR => {
                self.send_output(data as u8);
                true
            },
            _ => false
        }
    }

    fn io_reset(&mut self) {
        self.output.clear();
    }
}
