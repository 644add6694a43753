//! # Transport Module
//!
//! The engine talks to the controller through the `Transport` trait, an ordered byte
//! stream where every read or write is bounded by a deadline.  Nothing here ever
//! blocks indefinitely; when a deadline passes the caller simply gets less data.
//!
//! * `serial::SerialTransport` is the real thing, a serial port at high baud
//! * `mem::MemTransport` is a scripted stream for tests and loopback work

pub mod serial;
pub mod mem;

use std::io;
use std::time::{Duration,Instant};

pub trait Transport {
    fn is_open(&self) -> bool;
    /// Return between 0 and `max_len` bytes, never blocking past `deadline`.
    fn read(&mut self,max_len: usize,deadline: Instant) -> io::Result<Vec<u8>>;
    /// Write and wait for the bytes to leave, never blocking past `deadline`.
    /// Returns the count of bytes written.
    fn write(&mut self,dat: &[u8],deadline: Instant) -> io::Result<usize>;
    /// Bytes waiting to be read, advisory only
    fn bytes_available(&mut self) -> io::Result<usize>;
}

/// Time left before `deadline`, zero if it has passed
pub fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

/// Accumulate up to `len` bytes over as many reads as it takes.
/// Each read waits at most `attempt`, and the whole thing ends at `deadline`.
/// Stops early as soon as a read comes back empty, so the result can be short.
pub fn read_block<T: Transport + ?Sized>(transport: &mut T,len: usize,attempt: Duration,deadline: Instant) -> io::Result<Vec<u8>> {
    let mut ans = Vec::with_capacity(len);
    while ans.len() < len {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let chunk = transport.read(len - ans.len(),(now + attempt).min(deadline))?;
        if chunk.is_empty() {
            break;
        }
        ans.extend_from_slice(&chunk);
    }
    Ok(ans)
}

/// Write everything or fail with `TimedOut`.
pub fn write_all<T: Transport + ?Sized>(transport: &mut T,dat: &[u8],deadline: Instant) -> io::Result<()> {
    let count = transport.write(dat,deadline)?;
    if count != dat.len() {
        return Err(io::Error::new(io::ErrorKind::TimedOut,format!("wrote {} of {} bytes",count,dat.len())));
    }
    Ok(())
}
