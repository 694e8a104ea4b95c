//! UDP discovery of devices broadcasting on the local network.

use crate::codec::{ConstSizeBytes, WriteBytesExt, WriteToBytes, LE};
use crate::error::DriverError;
use crate::status::StatusSnapshot;
use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

/// The UDP port devices broadcast discovery beacons on.
pub const DISCOVERY_PORT: u16 = 7654;

/// The default TCP port devices accept streaming connections on.
pub const DEFAULT_DEVICE_PORT: u16 = 7765;

/// Discovery payload broadcast periodically by a device: its MAC, hardware/software revisions,
/// ring-buffer capacity, maximum point rate, and embedded [`StatusSnapshot`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BroadcastBeacon {
    pub mac: [u8; 6],
    pub hw_rev: u16,
    pub sw_rev: u16,
    pub buffer_capacity: u16,
    pub max_point_rate: u32,
    pub status: StatusSnapshot,
}

impl ConstSizeBytes for BroadcastBeacon {
    const SIZE_BYTES: usize = 36;
}

impl BroadcastBeacon {
    /// Parse a beacon from its 36-byte wire representation.
    pub fn parse(bytes: &[u8]) -> Result<Self, DriverError> {
        if bytes.len() < Self::SIZE_BYTES {
            return Err(DriverError::Decode { expected: Self::SIZE_BYTES, got: bytes.len() });
        }
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&bytes[0..6]);
        let hw_rev = u16::from_le_bytes([bytes[6], bytes[7]]);
        let sw_rev = u16::from_le_bytes([bytes[8], bytes[9]]);
        let buffer_capacity = u16::from_le_bytes([bytes[10], bytes[11]]);
        let max_point_rate = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        let status = StatusSnapshot::parse(&bytes[16..Self::SIZE_BYTES])?;
        Ok(BroadcastBeacon { mac, hw_rev, sw_rev, buffer_capacity, max_point_rate, status })
    }
}

impl WriteToBytes for BroadcastBeacon {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.mac)?;
        writer.write_u16::<LE>(self.hw_rev)?;
        writer.write_u16::<LE>(self.sw_rev)?;
        writer.write_u16::<LE>(self.buffer_capacity)?;
        writer.write_u32::<LE>(self.max_point_rate)?;
        self.status.write_to_bytes(&mut writer)?;
        Ok(())
    }
}

/// Bind the discovery socket on [`DISCOVERY_PORT`] and block until one beacon of at least 36
/// bytes arrives, returning its source address and parsed contents.
///
/// This is the "first" form of discovery: callers accept whichever device answers first.
pub fn find_first() -> Result<(SocketAddr, BroadcastBeacon), DriverError> {
    let socket = UdpSocket::bind(("0.0.0.0", DISCOVERY_PORT))?;
    find_first_on(socket)
}

/// Collect beacons arriving on [`DISCOVERY_PORT`] for `duration`, returning the most recently
/// seen beacon (and its address) for every unique MAC address observed.
///
/// This is the richer form of discovery described alongside [`find_first`]; the one-shot core
/// streaming path only needs the latter.
pub fn find_for_duration(
    duration: Duration,
) -> Result<HashMap<[u8; 6], (SocketAddr, BroadcastBeacon)>, DriverError> {
    let socket = UdpSocket::bind(("0.0.0.0", DISCOVERY_PORT))?;
    find_for_duration_on(socket, duration)
}

fn find_first_on(socket: UdpSocket) -> Result<(SocketAddr, BroadcastBeacon), DriverError> {
    let mut buf = [0u8; 1024];
    loop {
        let (len, addr) = socket.recv_from(&mut buf)?;
        if len < BroadcastBeacon::SIZE_BYTES {
            tracing::debug!(len, "discovery: ignoring undersized datagram");
            continue;
        }
        let beacon = BroadcastBeacon::parse(&buf[..len])?;
        tracing::info!(?addr, mac = ?beacon.mac, "discovery: found device");
        return Ok((addr, beacon));
    }
}

fn find_for_duration_on(
    socket: UdpSocket,
    duration: Duration,
) -> Result<HashMap<[u8; 6], (SocketAddr, BroadcastBeacon)>, DriverError> {
    socket.set_read_timeout(Some(Duration::from_millis(100)))?;
    let deadline = Instant::now() + duration;
    let mut found = HashMap::new();
    let mut buf = [0u8; 1024];
    while Instant::now() < deadline {
        match socket.recv_from(&mut buf) {
            Ok((len, addr)) if len >= BroadcastBeacon::SIZE_BYTES => {
                let beacon = BroadcastBeacon::parse(&buf[..len])?;
                found.insert(beacon.mac, (addr, beacon));
            }
            Ok(_) => tracing::debug!("discovery: ignoring undersized datagram"),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(found)
}
