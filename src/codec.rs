//! Wire codec primitives.
//!
//! All device protocol types are written-to and read-from little-endian bytes using the
//! **WriteBytes** and **ReadBytes** traits respectively. These traits are implemented for any
//! type implementing the **std::io** **Write** and **Read** traits, matching the way the rest of
//! this crate's frames are (de)serialized.
//!
//! Each concrete frame type lives in its own module (`point`, `status`, `command`); this module
//! only carries the shared adapter traits over `byteorder`.

pub use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io;

/// A trait for writing any wire type to little-endian bytes.
///
/// A blanket implementation is provided for all types that implement `byteorder::WriteBytesExt`.
pub trait WriteBytes {
    fn write_bytes<P: WriteToBytes>(&mut self, protocol: P) -> io::Result<()>;
}

/// A trait for reading any wire type from little-endian bytes.
///
/// A blanket implementation is provided for all types that implement `byteorder::ReadBytesExt`.
pub trait ReadBytes {
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P>;
}

/// Wire types that may be written to little-endian bytes.
pub trait WriteToBytes {
    /// Write `self` to bytes.
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()>;
}

/// Wire types that may be read from little-endian bytes.
pub trait ReadFromBytes: Sized {
    /// Read `Self` from bytes.
    fn read_from_bytes<R: ReadBytesExt>(reader: R) -> io::Result<Self>;
}

/// Wire types with a size in bytes that is constant across all values.
pub trait ConstSizeBytes {
    const SIZE_BYTES: usize;
}

impl<W> WriteBytes for W
where
    W: WriteBytesExt,
{
    fn write_bytes<P: WriteToBytes>(&mut self, protocol: P) -> io::Result<()> {
        protocol.write_to_bytes(self)
    }
}

impl<R> ReadBytes for R
where
    R: ReadBytesExt,
{
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P> {
        P::read_from_bytes(self)
    }
}

impl<'a, T> WriteToBytes for &'a T
where
    T: WriteToBytes,
{
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()> {
        (**self).write_to_bytes(writer)
    }
}
