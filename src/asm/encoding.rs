//! Formatters which can read and write object files to disk.
//!
//! The [`ObjFileFormat`] trait describes an implementation of reading/writing object files.
//! This module provides two implementations of the trait:
//! - [`BinaryFormat`]: the standard LC-3 `.obj` layout
//! - [`TextFormat`]: a human-readable hex dump

use std::fmt::Write;

use super::ObjectFile;

/// A trait defining object file formats.
pub trait ObjFileFormat {
    /// Representation of the serialized format.
    ///
    /// For binary formats, `[u8]` should be used.
    /// For text-based formats,`str` should be used.
    type Stream: ToOwned + ?Sized;
    /// Serializes into the stream format.
    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned;
    /// Deserializes from the stream format, returning `None`
    /// if the stream is not a valid object file.
    fn deserialize(i: &Self::Stream) -> Option<ObjectFile>;
}

/// The binary object file format.
///
/// The file is a sequence of big-endian words.
/// The first word is the origin, and every word after it is loaded
/// into consecutive addresses starting from that origin.
///
/// ```
/// use lc3_tutor::asm::ObjectFile;
/// use lc3_tutor::asm::encoding::{BinaryFormat, ObjFileFormat};
///
/// let obj = ObjectFile::new(0x3000, vec![0xF025]);
/// assert_eq!(BinaryFormat::serialize(&obj), [0x30, 0x00, 0xF0, 0x25]);
/// ```
pub struct BinaryFormat;

impl ObjFileFormat for BinaryFormat {
    type Stream = [u8];

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        std::iter::once(o.origin())
            .chain(o.words().iter().copied())
            .flat_map(u16::to_be_bytes)
            .collect()
    }

    fn deserialize(mut bytes: &Self::Stream) -> Option<ObjectFile> {
        if bytes.len() % 2 != 0 { return None; }

        let origin = u16::from_be_bytes(take::<2>(&mut bytes)?);
        let words = bytes.chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();

        Some(ObjectFile::new(origin, words))
    }
}

fn take<const N: usize>(data: &mut &[u8]) -> Option<[u8; N]> {
    if data.len() < N { return None; }
    let (left, right) = data.split_at(N);
    *data = right;
    left.try_into().ok()
}

/// A text-based object file format.
///
/// Each line holds one word as 4 hex digits, starting with the origin.
/// Blank lines and `//` comments are ignored when reading.
///
/// ```text
/// 3000
/// E002
/// F022
/// F025
/// ```
pub struct TextFormat;

impl ObjFileFormat for TextFormat {
    type Stream = str;

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        let mut buf = String::with_capacity(5 * (o.words().len() + 1));
        for word in std::iter::once(o.origin()).chain(o.words().iter().copied()) {
            // writing to a String cannot fail
            let _ = writeln!(buf, "{word:04X}");
        }
        buf
    }

    fn deserialize(string: &Self::Stream) -> Option<ObjectFile> {
        let mut words = string.lines()
            .map(|l| l.split_once("//").map_or(l, |(left, _)| left).trim())
            .filter(|l| !l.is_empty())
            .map(hex2u16);

        let origin = words.next()??;
        let words = words.collect::<Option<_>>()?;
        Some(ObjectFile::new(origin, words))
    }
}

fn hex2u16(s: &str) -> Option<u16> {
    let s = s.strip_prefix(['x', 'X']).unwrap_or(s);
    match s.len() == 4 {
        true  => u16::from_str_radix(s, 16).ok(),
        false => None
    }
}
