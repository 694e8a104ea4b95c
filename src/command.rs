//! Command frames sent from host to device.

use crate::codec::{WriteBytesExt, LE};
use crate::point::Point;

/// The opcode byte for each command.
pub mod opcode {
    pub const PING: u8 = b'?';
    pub const VERSION: u8 = b'v';
    pub const PREPARE: u8 = b'p';
    pub const BEGIN: u8 = b'b';
    pub const UPDATE: u8 = b'u';
    pub const WRITE_DATA: u8 = b'd';
    pub const STOP: u8 = b's';
    pub const CLEAR_E_STOP: u8 = b'c';
    pub const EMERGENCY_STOP: u8 = 0xFF;
}

/// A single command frame, ready to be written to the transport.
///
/// `WriteData` carries its points by reference so that a whole session's frame buffer can be
/// encoded without an intermediate copy.
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    Ping,
    Version,
    Prepare,
    Begin { lwm: u16, rate: u32 },
    Update { lwm: u16, rate: u32 },
    WriteData { points: &'a [Point] },
    Stop,
    ClearEStop,
    EmergencyStop,
}

impl<'a> Command<'a> {
    /// The opcode byte this command will be encoded with.
    pub fn opcode(&self) -> u8 {
        match self {
            Command::Ping => opcode::PING,
            Command::Version => opcode::VERSION,
            Command::Prepare => opcode::PREPARE,
            Command::Begin { .. } => opcode::BEGIN,
            Command::Update { .. } => opcode::UPDATE,
            Command::WriteData { .. } => opcode::WRITE_DATA,
            Command::Stop => opcode::STOP,
            Command::ClearEStop => opcode::CLEAR_E_STOP,
            Command::EmergencyStop => opcode::EMERGENCY_STOP,
        }
    }

    /// Encode this command to its wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            Command::Ping => vec![opcode::PING],
            Command::Version => vec![opcode::VERSION],
            Command::Prepare => vec![opcode::PREPARE],
            Command::Begin { lwm, rate } => begin(lwm, rate),
            Command::Update { lwm, rate } => update(lwm, rate),
            Command::WriteData { points } => write_data(points),
            Command::Stop => vec![opcode::STOP],
            Command::ClearEStop => vec![opcode::CLEAR_E_STOP],
            Command::EmergencyStop => vec![opcode::EMERGENCY_STOP],
        }
    }
}

/// Encode a `Begin` command: opcode, u16 low-water-mark, u32 scan rate. 7 bytes total.
pub fn begin(lwm: u16, rate: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(7);
    buf.write_u8(opcode::BEGIN).unwrap();
    buf.write_u16::<LE>(lwm).unwrap();
    buf.write_u32::<LE>(rate).unwrap();
    buf
}

/// Encode an `Update` command. Same layout as [`begin`], opcode `'u'`.
pub fn update(lwm: u16, rate: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(7);
    buf.write_u8(opcode::UPDATE).unwrap();
    buf.write_u16::<LE>(lwm).unwrap();
    buf.write_u32::<LE>(rate).unwrap();
    buf
}

/// Encode a `WriteData` command: opcode, u16 point count, then the concatenated 18-byte point
/// encodings.
pub fn write_data(points: &[Point]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3 + points.len() * 18);
    buf.write_u8(opcode::WRITE_DATA).unwrap();
    buf.write_u16::<LE>(points.len() as u16).unwrap();
    for point in points {
        buf.extend_from_slice(&point.encode());
    }
    buf
}
