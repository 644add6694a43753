//! # CLI Subcommands
//!
//! Contains modules that run the subcommands, and the operator console that
//! runs alongside the server.

pub mod serve;
pub mod console;
pub mod info;
pub mod ports;
pub mod completions;

use std::path::Path;
use log::error;
use crate::drive::{self,SharedDriveTable,Tier};
use crate::drive::file_store::FileStore;
use crate::DYNERR;

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("One of the parameters was out of range")]
    OutOfRange,
    #[error("File not found")]
    FileNotFound,
    #[error("No serial port was given")]
    NoTransport
}

/// Parse a mount request of the form `N=PATH`.
pub fn parse_mount(s: &str) -> Result<(usize,String),CommandError> {
    match s.split_once('=') {
        Some((idx,path)) if !path.is_empty() => match usize::from_str_radix(idx.trim(),10) {
            Ok(idx) => Ok((idx,path.to_string())),
            Err(_) => Err(CommandError::InvalidCommand)
        },
        _ => Err(CommandError::InvalidCommand)
    }
}

/// Open the image at `path` for reading and writing and put it in drive `idx`.
/// The file must already exist, it is never created.
pub fn mount_image(drives: &SharedDriveTable,idx: usize,path: &str) -> Result<Tier,DYNERR> {
    if !Path::new(path).is_file() {
        error!("{} is not a file",path);
        return Err(Box::new(CommandError::FileNotFound));
    }
    let mut table = drive::lock(drives);
    if !table.contains(idx) {
        error!("drive {} does not exist, there are {} drives",idx,table.count());
        return Err(Box::new(CommandError::OutOfRange));
    }
    let store = FileStore::open(path)?;
    Ok(table.mount(idx,Box::new(store))?)
}
