//! # Protocol Module
//!
//! Definitions shared by both directions of the FDC+ serial drive protocol.
//!
//! ## Commands
//!
//! Commands from the controller are ten byte frames, see `frame`.  The controller sends
//! * `STAT` about ten times per second, reporting the selected drive, head load and track
//! * `READ` to request a full track, the server answers with raw track data
//! * `WRIT` to write a full track, the server answers `WRIT` when ready, then `WSTA`
//!
//! Parameter 1 of `READ` and `WRIT` packs the drive number in the upper nibble and the
//! track number in the lower 12 bits.  Parameter 2 is the transfer length, which does
//! not include the two checksum bytes.
//!
//! ## Error Recovery
//!
//! The controller gives up on a response one second after it finishes sending.
//! Commands with a bad checksum are ignored so that the controller retries.
//! A bad checksum on write data is never ignored, it is answered with `WSTA` and
//! a checksum error code, because the controller is already waiting on the outcome.

pub mod checksum;
pub mod frame;
#[cfg(test)]
mod checksum_test;
#[cfg(test)]
mod frame_test;

use std::fmt;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use frame::Frame;

/// Length of every command or response frame
pub const FRAME_LEN: usize = 10;
/// Length of the part of a frame covered by its checksum
pub const COMMAND_LEN: usize = 8;
/// Longest track the server will transfer (32 sectors of 137 bytes)
pub const MAX_TRACK_LEN: usize = 137*32;
/// Drive byte in a `STAT` command when no drive is selected
pub const NO_DRIVE: u8 = 0xff;

pub type Tag = [u8;4];
pub const STAT: Tag = *b"STAT";
pub const READ: Tag = *b"READ";
pub const WRIT: Tag = *b"WRIT";
pub const WSTA: Tag = *b"WSTA";

/// Printable form of a tag, non-ASCII bytes are escaped.
pub fn tag_str(tag: &Tag) -> String {
    tag.iter().map(|b| std::ascii::escape_default(*b).to_string()).collect()
}

/// Response codes carried in parameter 1 of a response frame.
#[derive(FromPrimitive,Debug,Clone,Copy,PartialEq,Eq)]
pub enum ResponseCode {
    Ok = 0x0000,
    NotReady = 0x0001,
    ChecksumError = 0x0002,
    WriteError = 0x0003
}

impl ResponseCode {
    pub fn from_word(word: u16) -> Option<Self> {
        FromPrimitive::from_u16(word)
    }
    pub fn word(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f,"OK"),
            Self::NotReady => write!(f,"NOT READY"),
            Self::ChecksumError => write!(f,"CHECKSUM ERROR"),
            Self::WriteError => write!(f,"WRITE ERROR")
        }
    }
}

/// Reasons a command can fail.  Most of these are answered with silence, the controller
/// is expected to time out and retry.  During `WRIT` some are mapped to a response code,
/// see `Error::response_code`.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("command checksum mismatch, calculated {calc:04X} received {recv:04X}")]
    FrameChecksum { calc: u16, recv: u16 },
    #[error("incomplete command, {0} of 10 bytes before deadline")]
    PartialFrame(usize),
    #[error("unknown command {0}")]
    UnknownCommand(String),
    #[error("drive {0} does not exist")]
    InvalidDriveIndex(usize),
    #[error("drive {0} not mounted")]
    DriveNotMounted(usize),
    #[error("track length {0} exceeds {max} bytes", max = MAX_TRACK_LEN)]
    TrackLengthExceeded(u16),
    #[error("track {track} beyond last track {max}")]
    TrackOutOfRange { track: u16, max: u16 },
    #[error("could not seek to offset {0}")]
    SeekFailure(u64),
    #[error("read {got} of {want} bytes from image")]
    ShortStoreRead { got: usize, want: usize },
    #[error("wrote {got} of {want} bytes to image")]
    ShortStoreWrite { got: usize, want: usize },
    #[error("track checksum mismatch, calculated {calc:04X} received {recv:04X}")]
    PayloadChecksum { calc: u16, recv: u16 },
    #[error("received {got} of {want} bytes of track data")]
    ShortPayload { got: usize, want: usize }
}

impl Error {
    /// Code reported to the controller when this error ends a `WRIT` sequence.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            Self::DriveNotMounted(_) | Self::TrackLengthExceeded(_) | Self::TrackOutOfRange {..} => ResponseCode::NotReady,
            Self::PayloadChecksum {..} | Self::ShortPayload {..} => ResponseCode::ChecksumError,
            Self::SeekFailure(_) | Self::ShortStoreWrite {..} | Self::ShortStoreRead {..} => ResponseCode::WriteError,
            _ => ResponseCode::NotReady
        }
    }
}

/// A decoded command from the controller.
/// Drive numbers are not range checked here, that depends on the drive table.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Command {
    /// `drive` is `NO_DRIVE` if the controller has nothing selected
    Stat { drive: u8, head_loaded: bool, track: u16 },
    Read { drive: usize, track: u16, len: u16 },
    Write { drive: usize, track: u16, len: u16 }
}

impl Command {
    /// Interpret a frame by its tag.  The checksum is not examined.
    pub fn parse(frame: &Frame) -> Result<Self,Error> {
        let drive = (frame.param1 >> 12) as usize;
        let track = frame.param1 & 0x0fff;
        match frame.tag {
            STAT => Ok(Self::Stat {
                drive: (frame.param1 & 0x00ff) as u8,
                head_loaded: frame.param1 & 0xff00 != 0,
                track: frame.param2
            }),
            READ => Ok(Self::Read { drive, track, len: frame.param2 }),
            WRIT => Ok(Self::Write { drive, track, len: frame.param2 }),
            tag => Err(Error::UnknownCommand(tag_str(&tag)))
        }
    }
    /// Build the request frame, as the controller would send it.
    pub fn to_frame(&self) -> Frame {
        match *self {
            Self::Stat { drive, head_loaded, track } => {
                let head: u16 = if head_loaded { 0x0100 } else { 0 };
                Frame::new(STAT,head | drive as u16,track)
            },
            Self::Read { drive, track, len } => Frame::new(READ,((drive as u16) << 12) | (track & 0x0fff),len),
            Self::Write { drive, track, len } => Frame::new(WRIT,((drive as u16) << 12) | (track & 0x0fff),len)
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stat { drive: NO_DRIVE, head_loaded, track } => write!(f,"STAT no drive, head {}, track {}",head_loaded,track),
            Self::Stat { drive, head_loaded, track } => write!(f,"STAT drive {}, head {}, track {}",drive,head_loaded,track),
            Self::Read { drive, track, len } => write!(f,"READ drive {}, track {}, length {}",drive,track,len),
            Self::Write { drive, track, len } => write!(f,"WRIT drive {}, track {}, length {}",drive,track,len)
        }
    }
}
