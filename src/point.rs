//! The in-memory laser sample and its 18-byte wire encoding.

use crate::codec::{ConstSizeBytes, ReadBytesExt, ReadFromBytes, WriteBytesExt, WriteToBytes, LE};
use std::io;

/// One step in the laser stream: galvo position plus RGB intensity.
///
/// Values are held as supplied; the intensity-default rule (if `i == 0`, `i` becomes
/// `max(r, g, b)`) is applied at [`Point::encode`] time rather than at construction, so
/// intermediate mutation of the color fields is allowed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub flags: u16,
    pub x: i16,
    pub y: i16,
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub i: u16,
    pub u1: u16,
    pub u2: u16,
}

impl ConstSizeBytes for Point {
    const SIZE_BYTES: usize = 18;
}

impl Point {
    /// Construct a point at `(x, y)` with the given color. `i` defaults to `0`, which at encode
    /// time resolves to `max(r, g, b)`.
    pub fn new(x: i16, y: i16, r: u16, g: u16, b: u16) -> Self {
        Point { x, y, r, g, b, ..Point::default() }
    }

    /// Construct a point with an explicit intensity, overriding the default-intensity rule.
    pub fn with_intensity(x: i16, y: i16, r: u16, g: u16, b: u16, i: u16) -> Self {
        Point { x, y, r, g, b, i, ..Point::default() }
    }

    /// Construct a blanked point (all color channels zero) at `(x, y)`, used to move the beam
    /// invisibly.
    pub fn blank(x: i16, y: i16) -> Self {
        Point { x, y, ..Point::default() }
    }

    /// The intensity that will be written on encode: the supplied `i` if non-zero, otherwise the
    /// brightest of `r`, `g`, `b`.
    pub fn resolved_intensity(&self) -> u16 {
        if self.i != 0 {
            self.i
        } else {
            self.r.max(self.g).max(self.b)
        }
    }

    /// Encode this point to its 18-byte little-endian wire representation.
    pub fn encode(&self) -> [u8; Self::SIZE_BYTES] {
        let mut buf = [0u8; Self::SIZE_BYTES];
        self.write_to_bytes(&mut buf[..]).expect("fixed-size buffer write cannot fail");
        buf
    }

    /// Decode a point from its 18-byte little-endian wire representation.
    pub fn decode(bytes: &[u8; Self::SIZE_BYTES]) -> io::Result<Self> {
        Self::read_from_bytes(&bytes[..])
    }
}

impl WriteToBytes for Point {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u16::<LE>(self.flags)?;
        writer.write_i16::<LE>(self.x)?;
        writer.write_i16::<LE>(self.y)?;
        writer.write_u16::<LE>(self.r)?;
        writer.write_u16::<LE>(self.g)?;
        writer.write_u16::<LE>(self.b)?;
        writer.write_u16::<LE>(self.resolved_intensity())?;
        writer.write_u16::<LE>(self.u1)?;
        writer.write_u16::<LE>(self.u2)?;
        Ok(())
    }
}

impl ReadFromBytes for Point {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let flags = reader.read_u16::<LE>()?;
        let x = reader.read_i16::<LE>()?;
        let y = reader.read_i16::<LE>()?;
        let r = reader.read_u16::<LE>()?;
        let g = reader.read_u16::<LE>()?;
        let b = reader.read_u16::<LE>()?;
        let i = reader.read_u16::<LE>()?;
        let u1 = reader.read_u16::<LE>()?;
        let u2 = reader.read_u16::<LE>()?;
        Ok(Point { flags, x, y, r, g, b, i, u1, u2 })
    }
}
