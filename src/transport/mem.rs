//! In-memory transport.
//!
//! Inbound bytes are queued in bursts, and a read never crosses a burst boundary,
//! so a test can control exactly how a frame is split across reads.
//! A read with nothing queued waits out its deadline, like an idle serial line.

use std::collections::VecDeque;
use std::io;
use std::time::Instant;
use super::{Transport,remaining};

pub struct MemTransport {
    open: bool,
    inbound: VecDeque<Vec<u8>>,
    outbound: Vec<u8>
}

impl MemTransport {
    pub fn new() -> Self {
        Self {
            open: true,
            inbound: VecDeque::new(),
            outbound: Vec::new()
        }
    }
    pub fn set_open(&mut self,open: bool) {
        self.open = open;
    }
    /// Queue one burst of bytes from the controller
    pub fn push(&mut self,burst: &[u8]) {
        if !burst.is_empty() {
            self.inbound.push_back(burst.to_vec());
        }
    }
    /// Bytes still queued for reading
    pub fn pending(&self) -> usize {
        self.inbound.iter().map(|b| b.len()).sum()
    }
    /// Everything written so far
    pub fn output(&self) -> &[u8] {
        &self.outbound
    }
    /// Drain everything written so far
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl Default for MemTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemTransport {
    fn is_open(&self) -> bool {
        self.open
    }
    fn read(&mut self,max_len: usize,deadline: Instant) -> io::Result<Vec<u8>> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected,"transport is closed"));
        }
        let burst = match self.inbound.front_mut() {
            Some(burst) => burst,
            None => {
                std::thread::sleep(remaining(deadline));
                return Ok(Vec::new());
            }
        };
        let count = max_len.min(burst.len());
        let ans: Vec<u8> = burst.drain(0..count).collect();
        if burst.is_empty() {
            self.inbound.pop_front();
        }
        Ok(ans)
    }
    fn write(&mut self,dat: &[u8],_deadline: Instant) -> io::Result<usize> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected,"transport is closed"));
        }
        self.outbound.extend_from_slice(dat);
        Ok(dat.len())
    }
    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.pending())
    }
}
