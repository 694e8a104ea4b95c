//! A bounded byte conduit between a producer (the user's point generator) and the streaming
//! engine, implemented as a ring buffer behind a mutex and a pair of condition variables rather
//! than reaching for an external channel crate for what is, underneath, a byte pipe with two
//! ends.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex};

struct Inner {
    buf: VecDeque<u8>,
    capacity: usize,
    writer_closed: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    space_available: Condvar,
    data_available: Condvar,
}

/// The write half of a [`point_pipe`]. Exclusively owned by the user's generator for the
/// lifetime of a play session.
pub struct PipeWriter {
    shared: Arc<Shared>,
}

/// The read half of a [`point_pipe`]. Exclusively owned by the streaming engine for the lifetime
/// of a play session.
pub struct PipeReader {
    shared: Arc<Shared>,
}

/// Create a bounded byte pipe with room for `capacity` bytes before a writer blocks.
pub fn point_pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let shared = Arc::new(Shared {
        inner: Mutex::new(Inner {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            writer_closed: false,
        }),
        space_available: Condvar::new(),
        data_available: Condvar::new(),
    });
    (PipeWriter { shared: shared.clone() }, PipeReader { shared })
}

impl PipeWriter {
    /// Write `bytes` into the pipe, blocking while the pipe is full. Bytes become readable, in
    /// order, as soon as they're pushed; a writer that outruns the reader blocks rather than
    /// growing without bound.
    pub fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        let mut offset = 0;
        while offset < bytes.len() {
            let mut inner = self.shared.inner.lock().unwrap();
            loop {
                let free = inner.capacity - inner.buf.len();
                if free > 0 {
                    let n = free.min(bytes.len() - offset);
                    inner.buf.extend(&bytes[offset..offset + n]);
                    offset += n;
                    break;
                }
                inner = self.shared.space_available.wait(inner).unwrap();
            }
            drop(inner);
            self.shared.data_available.notify_all();
        }
        Ok(())
    }
}

impl io::Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.shared.inner.lock().unwrap().writer_closed = true;
        self.shared.data_available.notify_all();
    }
}

impl PipeReader {
    /// Read up to `buf.len()` bytes, blocking until at least one byte is available or the writer
    /// has closed and the pipe has drained. Returns `Ok(0)` only once the writer is closed and no
    /// bytes remain — true end-of-stream.
    pub fn read_bytes(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut inner = self.shared.inner.lock().unwrap();
        loop {
            if !inner.buf.is_empty() {
                let n = inner.buf.len().min(buf.len());
                for slot in buf.iter_mut().take(n) {
                    *slot = inner.buf.pop_front().unwrap();
                }
                drop(inner);
                self.shared.space_available.notify_all();
                return Ok(n);
            }
            if inner.writer_closed {
                return Ok(0);
            }
            inner = self.shared.data_available.wait(inner).unwrap();
        }
    }

    /// Read up to `buf.len()` bytes, repeating partial reads until `buf` is full or the writer
    /// closes. Returns the number of bytes actually filled: equal to `buf.len()` on a full read,
    /// less than `buf.len()` only once the writer has closed and the pipe has drained (a short
    /// final chunk), and `0` once there is truly nothing left. Bytes already read before EOF are
    /// never discarded — the caller decides what to do with a short final chunk.
    pub fn fill_partial(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_bytes(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}

impl io::Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(buf)
    }
}
