//! Memory handling for the LC-3 simulator.
//!
//! This module consists of:
//! - [`MemArray`]: The memory.
//! - [`RegFile`]: The register file.
//!
//! Both of these hold plain `u16` words.
//! Accessing them directly bypasses memory-mapped IO and does not touch
//! the simulator's statistics.

use crate::ast::Reg;

const N: usize = 1 << 16;

/// The memory of the machine: 65536 words, addressed by `u16`.
///
/// Indexing a [`MemArray`] reads and writes the raw array.
/// For accesses that go through memory-mapped IO, see [`Simulator::read_mem`] and [`Simulator::write_mem`].
///
/// ```
/// use lc3_tutor::sim::mem::MemArray;
///
/// let mut mem = MemArray::new();
/// mem[0x3000] = 0x1234;
/// assert_eq!(mem[0x3000], 0x1234);
/// assert_eq!(mem[0x3001], 0);
/// ```
///
/// [`Simulator::read_mem`]: super::Simulator::read_mem
/// [`Simulator::write_mem`]: super::Simulator::write_mem
#[derive(Clone, PartialEq, Eq)]
pub struct MemArray(Box<[u16; N]>);

impl MemArray {
    /// Creates a new zeroed memory array.
    pub fn new() -> Self {
        // Box::new([0; N]) would build the array on the stack first.
        let data = vec![0u16; N].into_boxed_slice();
        match data.try_into() {
            Ok(arr) => Self(arr),
            Err(_) => unreachable!("vec should have had {N} elements"),
        }
    }

    /// Copies a run of words into memory starting at `start`.
    ///
    /// Addresses wrap around the end of memory.
    pub fn copy_block(&mut self, start: u16, data: &[u16]) {
        let si = usize::from(start);
        let contiguous = data.len().min(N - si);
        let (left, right) = data.split_at(contiguous);

        self.0[si..(si + left.len())].copy_from_slice(left);
        for chunk in right.chunks(N) {
            self.0[..chunk.len()].copy_from_slice(chunk);
        }
    }

    /// Zeroes the entire memory.
    pub fn clear(&mut self) {
        self.0.fill(0);
    }

    /// Gets a view of the entire memory as a slice.
    pub fn as_slice(&self) -> &[u16] {
        &*self.0
    }
}
impl Default for MemArray {
    fn default() -> Self {
        Self::new()
    }
}
impl std::fmt::Debug for MemArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 65536 entries is not useful to print, so only print the nonzero ones.
        f.debug_map()
            .entries({
                self.0.iter()
                    .enumerate()
                    .filter(|&(_, &w)| w != 0)
                    .map(|(addr, w)| (format!("x{addr:04X}"), format!("x{w:04X}")))
            })
            .finish()
    }
}
impl std::ops::Index<u16> for MemArray {
    type Output = u16;

    fn index(&self, index: u16) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<u16> for MemArray {
    fn index_mut(&mut self, index: u16) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}

/// The register file.
///
/// Registers hold their bit pattern as a `u16`.
/// Their signed value can be read with `as i16` casting.
///
/// ```
/// use lc3_tutor::sim::mem::RegFile;
/// use lc3_tutor::ast::reg_consts::R0;
///
/// let mut reg = RegFile::new();
/// reg[R0] = 0xFFFF;
/// assert_eq!(reg[R0] as i16, -1);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegFile([u16; 8]);
impl RegFile {
    /// Creates a register file with all registers set to zero.
    pub fn new() -> Self {
        Self([0; 8])
    }

    /// Gets the values of all registers (`R0` first).
    pub fn values(&self) -> [u16; 8] {
        self.0
    }
}
impl std::ops::Index<Reg> for RegFile {
    type Output = u16;

    fn index(&self, index: Reg) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}
