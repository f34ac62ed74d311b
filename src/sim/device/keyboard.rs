use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::{ExternalDevice, KBDR, KBSR};

/// A pull-based source of keyboard input.
///
/// When the keyboard's buffer is empty, the keyboard polls its source (if it has one).
/// Returning `None` means no character is available right now.
///
/// This is implemented for closures:
/// ```
/// use lc3_tutor::sim::device::Keyboard;
///
/// let mut chars = "hi".bytes();
/// let mut kb = Keyboard::default();
/// kb.set_source(move || chars.next());
///
/// assert_eq!(kb.pop_input(), Some(b'h'));
/// assert_eq!(kb.pop_input(), Some(b'i'));
/// assert_eq!(kb.pop_input(), None);
/// ```
pub trait InputSource {
    /// Gets the next character, if one is available.
    fn poll(&mut self) -> Option<u8>;
}
impl<F: FnMut() -> Option<u8>> InputSource for F {
    fn poll(&mut self) -> Option<u8> {
        self()
    }
}

/// An input source fed by a channel.
///
/// This lets another thread (e.g., one reading a terminal) send keystrokes
/// to the simulator. Polling never blocks.
///
/// ```
/// use lc3_tutor::sim::device::{ChannelInput, InputSource};
///
/// let (tx, mut input) = ChannelInput::pair();
/// assert_eq!(input.poll(), None);
///
/// std::thread::spawn(move || tx.send(b'A')).join().unwrap().unwrap();
/// assert_eq!(input.poll(), Some(b'A'));
/// ```
#[derive(Debug, Clone)]
pub struct ChannelInput(Receiver<u8>);
impl ChannelInput {
    /// Creates an input source from a receiver.
    pub fn new(rx: Receiver<u8>) -> Self {
        Self(rx)
    }

    /// Creates an input source, along with the sender which feeds it.
    pub fn pair() -> (Sender<u8>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self(rx))
    }

    /// Checks whether every sender has been dropped and no input remains.
    pub fn is_closed(&self) -> bool {
        self.0.is_empty() && matches!(self.0.try_recv(), Err(TryRecvError::Disconnected))
    }
}
impl InputSource for ChannelInput {
    fn poll(&mut self) -> Option<u8> {
        self.0.try_recv().ok()
    }
}

/// The keyboard.
///
/// It holds a buffer of pending characters, and optionally
/// an [`InputSource`] to pull from when the buffer runs dry.
#[derive(Default)]
pub struct Keyboard {
    buffer: VecDeque<u8>,
    source: Option<Box<dyn InputSource>>
}
impl Keyboard {
    /// Appends one character to the input buffer.
    pub fn push(&mut self, byte: u8) {
        self.buffer.push_back(byte);
    }

    /// Appends every byte of a string to the input buffer.
    pub fn push_str(&mut self, s: &str) {
        self.buffer.extend(s.bytes());
    }

    /// Sets the input source, replacing the previous one.
    pub fn set_source(&mut self, source: impl InputSource + 'static) {
        self.source = Some(Box::new(source));
    }

    /// Removes the input source.
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// The characters waiting in the buffer.
    pub fn buffer(&self) -> &VecDeque<u8> {
        &self.buffer
    }

    /// Whether a character is available.
    ///
    /// If the buffer is empty, this polls the source once
    /// and keeps the character it yields in the buffer.
    pub fn ready(&mut self) -> bool {
        if self.buffer.is_empty() {
            if let Some(byte) = self.source.as_mut().and_then(|s| s.poll()) {
                self.buffer.push_back(byte);
            }
        }
        !self.buffer.is_empty()
    }

    /// Reads and removes the next character.
    pub fn pop_input(&mut self) -> Option<u8> {
        match self.buffer.pop_front() {
            Some(byte) => Some(byte),
            None => self.source.as_mut()?.poll(),
        }
    }
}
impl std::fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyboard")
            .field("buffer", &self.buffer)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}
impl ExternalDevice for Keyboard {
    fn io_read(&mut self, addr: u16) -> Option<u16> {
        match addr {
            KBSR => Some(u16::from(self.ready()) << 15),
            // Reading KBDR with nothing typed reads as 0.
            KBDR => Some(self.pop_input().map_or(0, u16::from)),
            _ => None
        }
    }

    fn io_write(&mut self, _addr: u16, _data: u16) -> bool {
        false
    }

    fn io_reset(&mut self) {
        // The source is configuration, so it is kept.
        self.buffer.clear();
    }
}
