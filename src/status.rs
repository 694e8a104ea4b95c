//! Status, response and discovery-beacon frames decoded from the device.

use crate::codec::{ConstSizeBytes, ReadBytesExt, ReadFromBytes, WriteBytesExt, WriteToBytes, LE};
use crate::error::DriverError;
use std::fmt;
use std::io;

/// The light engine's thermal/safety state, reported in every [`StatusSnapshot`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LightEngineState {
    Ready,
    Warmup,
    CoolDown,
    EStop,
    /// A value outside the four documented states; preserved rather than rejected, since the
    /// device firmware is free to add states across revisions.
    Other(u8),
}

impl From<u8> for LightEngineState {
    fn from(b: u8) -> Self {
        match b {
            0 => LightEngineState::Ready,
            1 => LightEngineState::Warmup,
            2 => LightEngineState::CoolDown,
            3 => LightEngineState::EStop,
            other => LightEngineState::Other(other),
        }
    }
}

impl From<LightEngineState> for u8 {
    fn from(s: LightEngineState) -> Self {
        match s {
            LightEngineState::Ready => 0,
            LightEngineState::Warmup => 1,
            LightEngineState::CoolDown => 2,
            LightEngineState::EStop => 3,
            LightEngineState::Other(b) => b,
        }
    }
}

/// The device's playback state, as tracked by the streaming engine's state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Idle,
    Prepared,
    Playing,
    /// A value outside the three documented states.
    Other(u8),
}

impl From<u8> for PlaybackState {
    fn from(b: u8) -> Self {
        match b {
            0 => PlaybackState::Idle,
            1 => PlaybackState::Prepared,
            2 => PlaybackState::Playing,
            other => PlaybackState::Other(other),
        }
    }
}

impl From<PlaybackState> for u8 {
    fn from(s: PlaybackState) -> Self {
        match s {
            PlaybackState::Idle => 0,
            PlaybackState::Prepared => 1,
            PlaybackState::Playing => 2,
            PlaybackState::Other(b) => b,
        }
    }
}

/// The set bit in `playback_flags` meaning an error condition is asserted.
pub const PLAYBACK_FLAG_ERROR: u16 = 0x02;
/// The set bit in `playback_flags` meaning the buffer underflowed.
pub const PLAYBACK_FLAG_UNDERFLOW: u16 = 0x04;

/// A snapshot of device status, parsed from the 20 bytes that follow every command response (and
/// embedded at the tail of a [`crate::discovery::BroadcastBeacon`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusSnapshot {
    pub protocol: u8,
    pub light_engine_state: u8,
    pub playback_state: u8,
    pub source: u8,
    pub light_engine_flags: u16,
    pub playback_flags: u16,
    pub source_flags: u16,
    pub buffer_fullness: u16,
    pub point_rate: u32,
    pub point_count: u32,
}

impl ConstSizeBytes for StatusSnapshot {
    const SIZE_BYTES: usize = 20;
}

impl StatusSnapshot {
    /// Parse a status snapshot from its 20-byte wire representation. Fails with
    /// [`DriverError::Decode`] if fewer than 20 bytes are supplied.
    pub fn parse(bytes: &[u8]) -> Result<Self, DriverError> {
        if bytes.len() < Self::SIZE_BYTES {
            return Err(DriverError::Decode { expected: Self::SIZE_BYTES, got: bytes.len() });
        }
        Self::read_from_bytes(&bytes[..Self::SIZE_BYTES]).map_err(|_| DriverError::Decode {
            expected: Self::SIZE_BYTES,
            got: bytes.len(),
        })
    }

    /// The decoded [`LightEngineState`].
    pub fn light_engine_state(&self) -> LightEngineState {
        LightEngineState::from(self.light_engine_state)
    }

    /// The decoded [`PlaybackState`].
    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState::from(self.playback_state)
    }

    /// Whether an error or underflow flag is currently asserted on the playback channel.
    pub fn has_playback_fault(&self) -> bool {
        self.playback_flags & (PLAYBACK_FLAG_ERROR | PLAYBACK_FLAG_UNDERFLOW) != 0
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "light engine: state {}, flags {:#06x}; playback: state {}, flags {:#06x}; \
             buffer: {} points; rate: {} pps, played: {}; source: {}, flags {:#06x}",
            self.light_engine_state,
            self.light_engine_flags,
            self.playback_state,
            self.playback_flags,
            self.buffer_fullness,
            self.point_rate,
            self.point_count,
            self.source,
            self.source_flags,
        )
    }
}

impl WriteToBytes for StatusSnapshot {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.protocol)?;
        writer.write_u8(self.light_engine_state)?;
        writer.write_u8(self.playback_state)?;
        writer.write_u8(self.source)?;
        writer.write_u16::<LE>(self.light_engine_flags)?;
        writer.write_u16::<LE>(self.playback_flags)?;
        writer.write_u16::<LE>(self.source_flags)?;
        writer.write_u16::<LE>(self.buffer_fullness)?;
        writer.write_u32::<LE>(self.point_rate)?;
        writer.write_u32::<LE>(self.point_count)?;
        Ok(())
    }
}

impl ReadFromBytes for StatusSnapshot {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let protocol = reader.read_u8()?;
        let light_engine_state = reader.read_u8()?;
        let playback_state = reader.read_u8()?;
        let source = reader.read_u8()?;
        let light_engine_flags = reader.read_u16::<LE>()?;
        let playback_flags = reader.read_u16::<LE>()?;
        let source_flags = reader.read_u16::<LE>()?;
        let buffer_fullness = reader.read_u16::<LE>()?;
        let point_rate = reader.read_u32::<LE>()?;
        let point_count = reader.read_u32::<LE>()?;
        Ok(StatusSnapshot {
            protocol,
            light_engine_state,
            playback_state,
            source,
            light_engine_flags,
            playback_flags,
            source_flags,
            buffer_fullness,
            point_rate,
            point_count,
        })
    }
}

/// The response byte at the head of every [`ResponseFrame`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Ack,
    NakFull,
    NakInvalid,
    NakStopCondition,
    /// An undocumented response byte, preserved rather than rejected.
    Other(u8),
}

impl From<u8> for ResponseKind {
    fn from(b: u8) -> Self {
        match b {
            b'a' => ResponseKind::Ack,
            b'F' => ResponseKind::NakFull,
            b'I' => ResponseKind::NakInvalid,
            b'!' => ResponseKind::NakStopCondition,
            other => ResponseKind::Other(other),
        }
    }
}

impl From<ResponseKind> for u8 {
    fn from(k: ResponseKind) -> Self {
        match k {
            ResponseKind::Ack => b'a',
            ResponseKind::NakFull => b'F',
            ResponseKind::NakInvalid => b'I',
            ResponseKind::NakStopCondition => b'!',
            ResponseKind::Other(b) => b,
        }
    }
}

/// The 22-byte frame the device sends in reply to every command: a response byte, the echoed
/// opcode, and a [`StatusSnapshot`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResponseFrame {
    pub response: u8,
    pub echoed_opcode: u8,
    pub status: StatusSnapshot,
}

impl ConstSizeBytes for ResponseFrame {
    const SIZE_BYTES: usize = 22;
}

impl ResponseFrame {
    /// Parse a response frame from its 22-byte wire representation.
    pub fn parse(bytes: &[u8]) -> Result<Self, DriverError> {
        if bytes.len() < Self::SIZE_BYTES {
            return Err(DriverError::Decode { expected: Self::SIZE_BYTES, got: bytes.len() });
        }
        let response = bytes[0];
        let echoed_opcode = bytes[1];
        let status = StatusSnapshot::parse(&bytes[2..Self::SIZE_BYTES])?;
        Ok(ResponseFrame { response, echoed_opcode, status })
    }

    pub fn response_kind(&self) -> ResponseKind {
        ResponseKind::from(self.response)
    }
}

impl WriteToBytes for ResponseFrame {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.response)?;
        writer.write_u8(self.echoed_opcode)?;
        writer.write_bytes(self.status)?;
        Ok(())
    }
}
