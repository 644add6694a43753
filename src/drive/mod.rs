//! # Drive Module
//!
//! The drive table is a fixed arena of drive slots created at startup.  A slot is
//! mounted when it holds a `DriveStore`, which is usually a disk image file.
//! The operator can mount or unmount any slot at any time, so the table is normally
//! shared between the engine and the operator interface, see `SharedDriveTable`.
//!
//! ## Selection
//!
//! The real hardware selects one drive at a time.  Every `STAT`, `READ`, or `WRIT`
//! that names a valid drive clears the enabled and head-loaded flags on all drives,
//! and then sets them on the named drive.  This is done by `DriveTable::select`.
//!
//! ## Track Tiers
//!
//! The highest track number is inferred from the image size when it is mounted,
//! see `Tier`.  The limit is inclusive, e.g., a minidisk image accepts tracks 0 to 34.

pub mod file_store;
pub mod mem_store;

use std::fmt;
use std::io;
use std::sync::{Arc,Mutex,MutexGuard};
use log::{info,warn};
use crate::MAX_DRIVES;

/// Images smaller than this are minidisks
pub const MINIDISK_LIMIT: u64 = 200_000;
/// Images smaller than this (and not minidisks) are 8 inch floppies
pub const FLOPPY_LIMIT: u64 = 500_000;

#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("drive {0} does not exist")]
    NoSuchDrive(usize),
    #[error("drive {0} is not mounted")]
    NotMounted(usize),
    #[error("drive {0} is already mounted")]
    AlreadyMounted(usize),
    #[error("image storage: {0}")]
    Store(#[from] io::Error)
}

/// Size class of a mounted image, determines the highest track number.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Tier {
    Minidisk,
    Floppy,
    Large
}

impl Tier {
    pub fn from_size(size: u64) -> Self {
        if size < MINIDISK_LIMIT {
            Self::Minidisk
        } else if size < FLOPPY_LIMIT {
            Self::Floppy
        } else {
            Self::Large
        }
    }
    /// Highest valid track number, inclusive
    pub fn max_track(&self) -> u16 {
        match self {
            Self::Minidisk => 34,
            Self::Floppy => 76,
            Self::Large => 2047
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minidisk => write!(f,"minidisk"),
            Self::Floppy => write!(f,"8 inch floppy"),
            Self::Large => write!(f,"large disk")
        }
    }
}

/// Backing storage for a mounted drive.
/// This is modeled on a file that is opened for reading and writing, and never truncated.
pub trait DriveStore: Send {
    /// name to show the operator, e.g. the file name
    fn name(&self) -> String;
    fn size(&mut self) -> io::Result<u64>;
    fn seek(&mut self,offset: u64) -> io::Result<()>;
    /// Read up to `len` bytes from the current position, fewer only at end of storage.
    fn read(&mut self,len: usize) -> io::Result<Vec<u8>>;
    /// Write at the current position, returning the count of bytes actually written.
    fn write(&mut self,dat: &[u8]) -> io::Result<usize>;
    fn flush(&mut self) -> io::Result<()>;
}

/// One drive slot
pub struct Drive {
    store: Option<Box<dyn DriveStore>>,
    max_track: u16,
    cur_track: u16,
    enabled: bool,
    head_loaded: bool,
    reads: u64,
    writes: u64
}

impl Drive {
    fn new() -> Self {
        Self {
            store: None,
            max_track: 0,
            cur_track: 0,
            enabled: false,
            head_loaded: false,
            reads: 0,
            writes: 0
        }
    }
    pub fn is_mounted(&self) -> bool {
        self.store.is_some()
    }
    pub fn name(&self) -> Option<String> {
        self.store.as_ref().map(|s| s.name())
    }
    pub fn max_track(&self) -> u16 {
        self.max_track
    }
    pub fn cur_track(&self) -> u16 {
        self.cur_track
    }
    pub fn enabled(&self) -> bool {
        self.enabled
    }
    pub fn head_loaded(&self) -> bool {
        self.head_loaded
    }
    /// tracks read since mount
    pub fn reads(&self) -> u64 {
        self.reads
    }
    /// tracks written since mount
    pub fn writes(&self) -> u64 {
        self.writes
    }
    pub fn track_in_range(&self,track: u16) -> bool {
        track <= self.max_track
    }
    pub fn set_track(&mut self,track: u16) {
        self.cur_track = track;
    }
    pub fn store(&mut self) -> Option<&mut Box<dyn DriveStore>> {
        self.store.as_mut()
    }
    pub fn count_read(&mut self) {
        self.reads += 1;
    }
    pub fn count_write(&mut self) {
        self.writes += 1;
    }
    fn clear(&mut self) {
        *self = Self::new();
    }
}

pub struct DriveTable {
    drives: Vec<Drive>
}

impl DriveTable {
    /// Create `count` unmounted drives, `count` is clamped to 1..=16
    pub fn new(count: usize) -> Self {
        let count = count.clamp(1,MAX_DRIVES);
        Self {
            drives: (0..count).map(|_| Drive::new()).collect()
        }
    }
    pub fn count(&self) -> usize {
        self.drives.len()
    }
    /// Drive numbers are valid if strictly less than the count
    pub fn contains(&self,idx: usize) -> bool {
        idx < self.drives.len()
    }
    pub fn get(&self,idx: usize) -> Option<&Drive> {
        self.drives.get(idx)
    }
    pub fn get_mut(&mut self,idx: usize) -> Option<&mut Drive> {
        self.drives.get_mut(idx)
    }
    pub fn iter(&self) -> std::slice::Iter<'_,Drive> {
        self.drives.iter()
    }
    /// Attach storage to an empty slot and classify it by size.
    pub fn mount(&mut self,idx: usize,mut store: Box<dyn DriveStore>) -> Result<Tier,Error> {
        let drive = self.drives.get_mut(idx).ok_or(Error::NoSuchDrive(idx))?;
        if drive.is_mounted() {
            return Err(Error::AlreadyMounted(idx));
        }
        let size = store.size()?;
        let tier = Tier::from_size(size);
        info!("mount {} on drive {}: {} bytes, {}, last track {}",store.name(),idx,size,tier,tier.max_track());
        drive.clear();
        drive.max_track = tier.max_track();
        drive.store = Some(store);
        Ok(tier)
    }
    /// Detach storage and clear all state of this one slot.
    pub fn unmount(&mut self,idx: usize) -> Result<(),Error> {
        let drive = self.drives.get_mut(idx).ok_or(Error::NoSuchDrive(idx))?;
        match drive.store.take() {
            Some(mut store) => {
                if let Err(e) = store.flush() {
                    warn!("flush failed while unmounting {}: {}",store.name(),e);
                }
                info!("unmount {} from drive {}",store.name(),idx);
                drive.clear();
                Ok(())
            },
            None => Err(Error::NotMounted(idx))
        }
    }
    /// Bit `i` is set if drive `i` is mounted
    pub fn mounted_mask(&self) -> u16 {
        self.drives.iter().enumerate()
            .filter(|(_,d)| d.is_mounted())
            .fold(0,|mask,(i,_)| mask | (1 << i))
    }
    pub fn deselect_all(&mut self) {
        for drive in self.drives.iter_mut() {
            drive.enabled = false;
            drive.head_loaded = false;
        }
    }
    /// Make `idx` the only enabled drive.
    pub fn select(&mut self,idx: usize,head_loaded: bool) -> Result<(),Error> {
        if !self.contains(idx) {
            return Err(Error::NoSuchDrive(idx));
        }
        self.deselect_all();
        self.drives[idx].enabled = true;
        self.drives[idx].head_loaded = head_loaded;
        Ok(())
    }
    pub fn selected(&self) -> Option<usize> {
        self.drives.iter().position(|d| d.enabled)
    }
}

pub type SharedDriveTable = Arc<Mutex<DriveTable>>;

pub fn shared(table: DriveTable) -> SharedDriveTable {
    Arc::new(Mutex::new(table))
}

/// Lock the shared table.  A panic on another thread cannot leave a slot
/// half-cleared, so a poisoned lock is simply taken over.
pub fn lock(table: &SharedDriveTable) -> MutexGuard<'_,DriveTable> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
