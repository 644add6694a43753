//! Parse a settings file.
//!
//! The file is a JSON object.  Only the keys below are looked at, anything else is ignored,
//! and a value of the wrong type leaves the default in place.
//! ```json
//! {
//!     "port": "/dev/ttyUSB0",
//!     "baud": 403200,
//!     "drives": 4,
//!     "mount": ["cpm22.dsk", null, "games.dsk"],
//!     "timing": { "pollMs": 10, "commandMs": 50, "payloadMs": 250, "payloadAttemptMs": 100, "writeMs": 1000 }
//! }
//! ```

use std::time::Duration;
use serde_json;
use log::warn;
use crate::engine::Config;
use crate::transport::serial::{BAUD_RATES,DEFAULT_BAUD};
use crate::{DYNERR,MAX_DRIVES};

#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("settings are not a JSON object")]
    NotAnObject,
    #[error("drive count {0} out of range")]
    DriveCount(u64),
    #[error("mount list has {0} entries but there are only {1} drives")]
    MountList(usize,usize),
    #[error("timing value {0} = {1} ms out of range")]
    Timing(String,u64)
}

/// Allowed range of every timing value in milliseconds, same as the command line
pub const TIMING_RANGE: std::ops::Range<u64> = 1..60_000;

#[derive(Clone,Debug,PartialEq)]
pub struct Settings {
    pub port: Option<String>,
    pub baud: u32,
    pub engine: Config,
    /// image to mount in each slot at startup, index is the drive
    pub mount: Vec<Option<String>>
}

impl Settings {
    pub fn new() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
            engine: Config::default(),
            mount: Vec::new()
        }
    }
    /// Mount requests paired with their drive index
    pub fn mount_requests(&self) -> Vec<(usize,String)> {
        self.mount.iter().enumerate().filter_map(|(i,p)| p.as_ref().map(|p| (i,p.clone()))).collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Try to update a string from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
fn update_json_string_opt(maybe_obj: &serde_json::Value,key: &str,curr: &mut Option<String>) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(s) = x.as_str() {
                *curr = Some(s.to_string());
            }
        }
    }
}

fn update_json_u64(maybe_obj: &serde_json::Value,key: &str,curr: &mut u64) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(n) = x.as_u64() {
                *curr = n;
            }
        }
    }
}

fn update_json_millis(maybe_obj: &serde_json::Value,key: &str,curr: &mut Duration) -> Result<(),Error> {
    let mut ms = curr.as_millis() as u64;
    update_json_u64(maybe_obj,key,&mut ms);
    if !TIMING_RANGE.contains(&ms) {
        return Err(Error::Timing(key.to_string(),ms));
    }
    *curr = Duration::from_millis(ms);
    Ok(())
}

/// Strings are paths, anything else leaves the slot empty.
fn update_json_mount(maybe_obj: &serde_json::Value,key: &str,curr: &mut Vec<Option<String>>) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(a) = x.as_array() {
                *curr = a.iter().map(|v| v.as_str().map(|s| s.to_string())).collect();
            }
        }
    }
}

pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    let root = serde_json::from_str::<serde_json::Value>(json)?;
    if !root.is_object() {
        return Err(Box::new(Error::NotAnObject));
    }
    update_json_string_opt(&root,"port",&mut ans.port);
    let mut baud = ans.baud as u64;
    update_json_u64(&root,"baud",&mut baud);
    ans.baud = u32::try_from(baud)?;
    if !BAUD_RATES.contains(&ans.baud) {
        warn!("baud rate {} is not one the controller uses",ans.baud);
    }
    let mut drives = ans.engine.drives as u64;
    update_json_u64(&root,"drives",&mut drives);
    if drives < 1 || drives > MAX_DRIVES as u64 {
        return Err(Box::new(Error::DriveCount(drives)));
    }
    ans.engine.drives = drives as usize;
    update_json_mount(&root,"mount",&mut ans.mount);
    if ans.mount.len() > ans.engine.drives {
        return Err(Box::new(Error::MountList(ans.mount.len(),ans.engine.drives)));
    }
    if let Some(timing) = root.get("timing") {
        update_json_millis(timing,"pollMs",&mut ans.engine.poll)?;
        update_json_millis(timing,"commandMs",&mut ans.engine.command_timeout)?;
        update_json_millis(timing,"payloadMs",&mut ans.engine.payload_timeout)?;
        update_json_millis(timing,"payloadAttemptMs",&mut ans.engine.payload_attempt)?;
        update_json_millis(timing,"writeMs",&mut ans.engine.write_timeout)?;
    }
    Ok(ans)
}

pub fn parse_file(path: &str) -> Result<Settings,DYNERR> {
    let json = std::fs::read_to_string(path)?;
    parse(&json)
}

#[cfg(test)]
mod settings_test;
