//! # Protocol Engine
//!
//! The engine is a single threaded state machine that handles one command at a time.
//! Each call to `Engine::step` waits briefly for bytes, and once a full frame has been
//! assembled it validates, dispatches, and answers it before returning.  A `WRIT`
//! includes the whole exchange of track data, so no new command is decoded while a
//! track is outstanding.
//!
//! Failures are never fatal.  A bad command is answered with silence and reported as
//! `Outcome::Dropped`, and the controller retries when its one second timeout expires.
//! Only a failing transport produces an `Err`, and even then the engine is ready for the
//! next call.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,AtomicU64,Ordering};
use std::time::{Duration,Instant};
use log::{trace,debug,warn,error};
use crate::drive::{self,SharedDriveTable};
use crate::protocol::{Command,Error,ResponseCode,FRAME_LEN,NO_DRIVE,STAT,WRIT,WSTA,tag_str};
use crate::protocol::frame::Frame;
use crate::track;
use crate::transport::{self,Transport};

const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Timing and size parameters of the engine.
#[derive(Debug,Clone,PartialEq)]
pub struct Config {
    /// number of drive slots
    pub drives: usize,
    /// how long each step waits for command bytes
    pub poll: Duration,
    /// a partial command is discarded this long after its first byte
    pub command_timeout: Duration,
    /// limit on receiving the track data of a `WRIT`
    pub payload_timeout: Duration,
    /// each read of `WRIT` track data waits at most this long
    pub payload_attempt: Duration,
    /// limit on sending any response
    pub write_timeout: Duration
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drives: crate::DEFAULT_DRIVES,
            poll: Duration::from_millis(10),
            command_timeout: Duration::from_millis(50),
            payload_timeout: Duration::from_millis(250),
            payload_attempt: Duration::from_millis(100),
            write_timeout: Duration::from_millis(1000)
        }
    }
}

/// Session counters, for the operator only.
#[derive(Default,Debug)]
pub struct Counters {
    stat: AtomicU64,
    read: AtomicU64,
    writ: AtomicU64,
    errors: AtomicU64
}

#[derive(Default,Debug,Clone,Copy,PartialEq,Eq)]
pub struct CounterSnapshot {
    pub stat: u64,
    pub read: u64,
    pub writ: u64,
    pub errors: u64
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1,Ordering::Relaxed);
    }
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            stat: self.stat.load(Ordering::Relaxed),
            read: self.read.load(Ordering::Relaxed),
            writ: self.writ.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed)
        }
    }
}

/// Something the server sends.  `READ` is answered with raw track data,
/// everything else with a frame.
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Reply {
    Frame(Frame),
    Track(Vec<u8>)
}

impl Reply {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Frame(frame) => frame.encode().to_vec(),
            Self::Track(dat) => dat.clone()
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum State {
    AwaitingFrame,
    Dispatching
}

/// Result of one step of the engine
#[derive(Debug)]
pub enum Outcome {
    /// no bytes arrived
    Idle,
    /// bytes of a command are buffered, the count is given
    Partial(usize),
    /// the command was answered, `code` is the last response code sent
    Handled { command: Command, code: ResponseCode },
    /// the command was ignored, nothing was sent
    Dropped(Error)
}

enum Fault {
    Drop(Error),
    Io(io::Error)
}

impl From<Error> for Fault {
    fn from(e: Error) -> Self {
        Self::Drop(e)
    }
}

impl From<io::Error> for Fault {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub struct Engine<T: Transport> {
    transport: T,
    drives: SharedDriveTable,
    config: Config,
    counters: Arc<Counters>,
    state: State,
    cmd_buf: [u8;FRAME_LEN],
    cmd_idx: usize,
    frame_start: Option<Instant>
}

impl<T: Transport> Engine<T> {
    pub fn new(transport: T,drives: SharedDriveTable,config: Config) -> Self {
        Self {
            transport,
            drives,
            config,
            counters: Arc::new(Counters::default()),
            state: State::AwaitingFrame,
            cmd_buf: [0;FRAME_LEN],
            cmd_idx: 0,
            frame_start: None
        }
    }
    pub fn transport(&self) -> &T {
        &self.transport
    }
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
    pub fn drives(&self) -> SharedDriveTable {
        Arc::clone(&self.drives)
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }
    pub fn state(&self) -> State {
        self.state
    }
    /// count of command bytes waiting for the rest of their frame
    pub fn buffered(&self) -> usize {
        self.cmd_idx
    }
    fn reset(&mut self) {
        self.cmd_idx = 0;
        self.frame_start = None;
        self.state = State::AwaitingFrame;
    }
    fn frame_expired(&self,now: Instant) -> bool {
        match self.frame_start {
            Some(start) => now.duration_since(start) >= self.config.command_timeout,
            None => false
        }
    }
    fn dropped(&self,e: Error) -> Outcome {
        warn!("{}",e);
        Counters::bump(&self.counters.errors);
        Outcome::Dropped(e)
    }
    fn send(&mut self,reply: Reply) -> io::Result<()> {
        let dat = reply.to_bytes();
        trace!("send {} bytes\n{}",dat.len(),crate::hex_rows(&dat));
        let deadline = Instant::now() + self.config.write_timeout;
        transport::write_all(&mut self.transport,&dat,deadline)
    }
    /// Wait up to the poll interval for command bytes, and handle the command if a frame
    /// is complete.  An expired partial frame is discarded.
    pub fn step(&mut self) -> io::Result<Outcome> {
        if !self.transport.is_open() {
            self.reset();
            return Ok(Outcome::Idle);
        }
        let deadline = Instant::now() + self.config.poll;
        let chunk = match self.transport.read(FRAME_LEN - self.cmd_idx,deadline) {
            Ok(chunk) => chunk,
            Err(e) => {
                self.reset();
                Counters::bump(&self.counters.errors);
                return Err(e);
            }
        };
        let now = Instant::now();
        let mut expired = None;
        if self.cmd_idx > 0 && self.frame_expired(now) {
            expired = Some(Error::PartialFrame(self.cmd_idx));
            self.reset();
        }
        if !chunk.is_empty() {
            trace!("received {} bytes at index {}",chunk.len(),self.cmd_idx);
            if self.cmd_idx == 0 {
                self.frame_start = Some(now);
            }
            let count = chunk.len().min(FRAME_LEN - self.cmd_idx);
            self.cmd_buf[self.cmd_idx..self.cmd_idx+count].copy_from_slice(&chunk[0..count]);
            self.cmd_idx += count;
        }
        if let Some(e) = expired {
            return Ok(self.dropped(e));
        }
        if self.cmd_idx == 0 {
            return Ok(Outcome::Idle);
        }
        if self.cmd_idx < FRAME_LEN {
            return Ok(Outcome::Partial(self.cmd_idx));
        }
        let frame = Frame::decode(&self.cmd_buf);
        self.reset();
        self.state = State::Dispatching;
        let ans = self.dispatch(frame);
        self.state = State::AwaitingFrame;
        match ans {
            Ok(outcome) => Ok(outcome),
            Err(Fault::Drop(e)) => Ok(self.dropped(e)),
            Err(Fault::Io(e)) => {
                Counters::bump(&self.counters.errors);
                Err(e)
            }
        }
    }
    /// Step until `stop` is set.  Transport failures are logged and retried.
    pub fn run(&mut self,stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            if !self.transport.is_open() {
                std::thread::sleep(self.config.poll);
                continue;
            }
            if let Err(e) = self.step() {
                error!("transport failure: {}",e);
                std::thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    fn dispatch(&mut self,frame: Frame) -> Result<Outcome,Fault> {
        trace!("command frame\n{}",crate::hex_rows(&frame.encode()));
        if !frame.is_valid() {
            return Err(Error::FrameChecksum { calc: frame.calc_checksum(), recv: frame.checksum }.into());
        }
        let command = Command::parse(&frame)?;
        debug!("{}",command);
        match command {
            Command::Stat { drive, head_loaded, track } => self.stat(command,drive,head_loaded,track),
            Command::Read { drive, track, len } => self.read(command,drive,track,len),
            Command::Write { drive, track, len } => self.write(command,&frame,drive,track,len)
        }
    }
    fn stat(&mut self,command: Command,drive: u8,head_loaded: bool,track: u16) -> Result<Outcome,Fault> {
        Counters::bump(&self.counters.stat);
        let mask = {
            let mut drives = drive::lock(&self.drives);
            let idx = drive as usize;
            if drive != NO_DRIVE && drives.contains(idx) {
                drives.select(idx,head_loaded).map_err(|_| Error::InvalidDriveIndex(idx))?;
                if let Some(d) = drives.get_mut(idx) {
                    d.set_track(track);
                }
            } else if drive != NO_DRIVE {
                debug!("STAT selection of drive {} ignored, {} drives",idx,drives.count());
            }
            drives.mounted_mask()
        };
        self.send(Reply::Frame(Frame::response(STAT,ResponseCode::Ok,mask)))?;
        debug!("{} response code={} data={:04X}",tag_str(&STAT),ResponseCode::Ok,mask);
        Ok(Outcome::Handled { command, code: ResponseCode::Ok })
    }
    fn read(&mut self,command: Command,drive: usize,track: u16,len: u16) -> Result<Outcome,Fault> {
        Counters::bump(&self.counters.read);
        let dat = {
            let mut drives = drive::lock(&self.drives);
            if !drives.contains(drive) {
                return Err(Error::InvalidDriveIndex(drive).into());
            }
            drives.select(drive,true).map_err(|_| Error::InvalidDriveIndex(drive))?;
            let d = drives.get_mut(drive).ok_or(Error::InvalidDriveIndex(drive))?;
            track::check_request(d,drive,track,len)?;
            d.set_track(track);
            track::read_track(d,drive,track,len)?
        };
        self.send(Reply::Track(dat))?;
        debug!("READ response {} bytes + checksum",len);
        Ok(Outcome::Handled { command, code: ResponseCode::Ok })
    }
    fn write(&mut self,command: Command,frame: &Frame,drive: usize,track: u16,len: u16) -> Result<Outcome,Fault> {
        Counters::bump(&self.counters.writ);
        let ready = {
            let mut drives = drive::lock(&self.drives);
            if !drives.contains(drive) {
                return Err(Error::InvalidDriveIndex(drive).into());
            }
            drives.select(drive,true).map_err(|_| Error::InvalidDriveIndex(drive))?;
            let d = drives.get_mut(drive).ok_or(Error::InvalidDriveIndex(drive))?;
            match track::check_request(d,drive,track,len) {
                Ok(()) => {
                    d.set_track(track);
                    ResponseCode::Ok
                },
                Err(e) => {
                    warn!("WRIT refused: {}",e);
                    e.response_code()
                }
            }
        };
        self.send(Reply::Frame(Frame::response(WRIT,ready,frame.param2)))?;
        debug!("WRIT response code={}",ready);
        if ready != ResponseCode::Ok {
            Counters::bump(&self.counters.errors);
            return Ok(Outcome::Handled { command, code: ready });
        }
        let want = len as usize + 2;
        let deadline = Instant::now() + self.config.payload_timeout;
        let block = transport::read_block(&mut self.transport,want,self.config.payload_attempt,deadline)?;
        debug!("WRIT received {} of {} bytes",block.len(),want);
        let result = {
            let mut drives = drive::lock(&self.drives);
            match drives.get_mut(drive) {
                Some(d) => track::write_track(d,drive,track,len,&block),
                None => Err(Error::InvalidDriveIndex(drive))
            }
        };
        let status = match result {
            Ok(()) => ResponseCode::Ok,
            Err(e) => {
                warn!("WRIT failed: {}",e);
                Counters::bump(&self.counters.errors);
                match e.response_code() {
                    ResponseCode::ChecksumError => ResponseCode::ChecksumError,
                    _ => ResponseCode::WriteError
                }
            }
        };
        self.send(Reply::Frame(Frame::response(WSTA,status,frame.param2)))?;
        debug!("{} response code={}",tag_str(&WSTA),status);
        Ok(Outcome::Handled { command, code: status })
    }
}
