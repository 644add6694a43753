//! # `fdcserve` main library
//!
//! This library serves Altair disk images over a serial port to computers running the
//! FDC+ Enhanced Floppy Disk Controller.  The controller always initiates, the server
//! only responds.
//!
//! ## Architecture
//!
//! The server is built around two trait objects and one state machine:
//! * `transport::Transport` is a deadline-bounded byte stream, usually a serial port
//! * `drive::DriveStore` is the backing storage of a mounted drive, usually an image file
//! * `engine::Engine` consumes one command at a time from the transport and acts on the drives
//!
//! The drives live in a `drive::DriveTable`, which is shared between the engine and
//! whatever operator interface mounts and unmounts images.  The table is a fixed arena
//! of slots, each slot holding an optional store.
//!
//! ## Wire Protocol
//!
//! Commands and responses are fixed length, ten byte frames, see `protocol::frame`.
//! Track data is sent raw, followed by a 16 bit checksum, see `track`.
//!
//! ## Disk Images
//!
//! Images are flat files sliced into fixed length tracks.  No attempt is made to
//! interpret the sectors within a track; that is the job of the controller.

pub mod protocol;
pub mod drive;
pub mod track;
pub mod transport;
pub mod engine;
pub mod settings;
pub mod commands;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Largest number of drives the protocol can address (4 bit drive field, 16 bit STAT mask)
pub const MAX_DRIVES: usize = 16;
/// Number of drives served by default
pub const DEFAULT_DRIVES: usize = 4;

/// Format bytes as rows of hex for trace logging, 16 bytes per row with offsets.
pub fn hex_rows(dat: &[u8]) -> String {
    let mut ans = String::new();
    for (row,chunk) in dat.chunks(16).enumerate() {
        ans += &format!("{:04X}: {}\n",row*16,hex::encode_upper(chunk));
    }
    ans
}
