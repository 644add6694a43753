//! Drive storage held in memory.
//!
//! The buffer is shared, so that the contents can be inspected or replaced while the
//! store is mounted.  Writes past the end extend the buffer, as a file would.
//! A write limit can be imposed to model a device that accepts only part of a write,
//! and seeks can be made to fail.  A failed seek leaves the position where it was.

use std::io;
use std::sync::{Arc,Mutex};
use std::sync::atomic::{AtomicBool,Ordering};
use super::DriveStore;

pub struct MemStore {
    name: String,
    data: Arc<Mutex<Vec<u8>>>,
    pos: usize,
    write_limit: Option<usize>,
    seek_fail: Arc<AtomicBool>
}

impl MemStore {
    pub fn new(name: &str,dat: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data: Arc::new(Mutex::new(dat)),
            pos: 0,
            write_limit: None,
            seek_fail: Arc::new(AtomicBool::new(false))
        }
    }
    /// Handle to the underlying buffer
    pub fn data(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.data)
    }
    /// Accept at most `limit` bytes per write call, `None` removes the limit.
    pub fn set_write_limit(&mut self,limit: Option<usize>) {
        self.write_limit = limit;
    }
    /// Make every seek fail, or succeed again.
    pub fn set_seek_fail(&self,fail: bool) {
        self.seek_fail.store(fail,Ordering::Relaxed);
    }
    /// Handle to the seek failure switch, usable after the store is mounted
    pub fn seek_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.seek_fail)
    }
    fn buffer(&self) -> std::sync::MutexGuard<'_,Vec<u8>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DriveStore for MemStore {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.buffer().len() as u64)
    }
    fn seek(&mut self,offset: u64) -> io::Result<()> {
        if self.seek_fail.load(Ordering::Relaxed) {
            return Err(io::Error::new(io::ErrorKind::Other,"seek refused"));
        }
        self.pos = usize::try_from(offset).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput,"offset too large"))?;
        Ok(())
    }
    fn read(&mut self,len: usize) -> io::Result<Vec<u8>> {
        let buf = self.buffer();
        let beg = self.pos.min(buf.len());
        let end = (beg + len).min(buf.len());
        let ans = buf[beg..end].to_vec();
        drop(buf);
        self.pos = end;
        Ok(ans)
    }
    fn write(&mut self,dat: &[u8]) -> io::Result<usize> {
        let count = match self.write_limit {
            Some(limit) => dat.len().min(limit),
            None => dat.len()
        };
        let pos = self.pos;
        let mut buf = self.buffer();
        if buf.len() < pos + count {
            buf.resize(pos + count,0);
        }
        buf[pos..pos+count].copy_from_slice(&dat[0..count]);
        drop(buf);
        self.pos += count;
        Ok(count)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
