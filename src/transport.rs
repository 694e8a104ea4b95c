//! A single buffered TCP connection to the device.

use crate::error::DriverError;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// How long [`Transport::connect`] waits for the initial TCP handshake before giving up.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// The read timeout applied to the socket so a wedged device cannot hang a blocking read
/// indefinitely (§5: "Blocking-I/O implementations MUST set per-read timeouts").
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// A single long-lived TCP socket to the device, with a read buffer that accumulates bytes from
/// the socket so `read_exact` can pull exactly the bytes a frame needs regardless of how the
/// kernel happened to chunk them.
pub struct Transport {
    stream: TcpStream,
    read_buf: VecDeque<u8>,
}

impl Transport {
    /// Resolve `addr` and connect with a 15-second timeout, applying [`DEFAULT_READ_TIMEOUT`] to
    /// the resulting socket.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, DriverError> {
        let addr = first_addr(addr)?;
        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
        stream.set_read_timeout(Some(DEFAULT_READ_TIMEOUT))?;
        stream.set_nodelay(true)?;
        Ok(Transport { stream, read_buf: VecDeque::new() })
    }

    /// Override the socket's read timeout (`None` disables it).
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), DriverError> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Read exactly `n` bytes, pulling more from the socket as needed.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, DriverError> {
        while self.read_buf.len() < n {
            let mut chunk = [0u8; 4096];
            let read = self.stream.read(&mut chunk)?;
            if read == 0 {
                return Err(DriverError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "device closed the connection",
                )));
            }
            self.read_buf.extend(&chunk[..read]);
        }
        Ok(self.read_buf.drain(..n).collect())
    }

    /// Write `bytes` to the socket, flushing a complete command.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), DriverError> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }
}

fn first_addr<A: ToSocketAddrs>(addr: A) -> Result<SocketAddr, DriverError> {
    addr.to_socket_addrs()?.next().ok_or_else(|| {
        DriverError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "address resolved to no socket addresses",
        ))
    })
}
