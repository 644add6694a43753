//! Run the server.
//!
//! Settings are taken from the defaults, then the settings file if given, then the command line.
//! The engine runs on the main thread and the operator console on a second thread.
//! When the console closes, the engine finishes its current command and stops.

use clap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,Ordering};
use std::time::Duration;
use log::{info,warn,error};
use crate::drive::{self,DriveTable};
use crate::engine::Engine;
use crate::settings::{self,Settings};
use crate::transport::serial::SerialTransport;
use crate::{DYNERR,STDRESULT,MAX_DRIVES};
use super::console::Console;
use super::CommandError;

fn apply_args(settings: &mut Settings,cmd: &clap::ArgMatches) -> STDRESULT {
    if let Some(port) = cmd.get_one::<String>("port") {
        settings.port = Some(port.clone());
    }
    if let Some(baud) = cmd.get_one::<u32>("baud") {
        settings.baud = *baud;
    }
    if let Some(count) = cmd.get_one::<u64>("drives") {
        settings.engine.drives = *count as usize;
    }
    if let Some(ms) = cmd.get_one::<u64>("command-ms") {
        settings.engine.command_timeout = Duration::from_millis(*ms);
    }
    if let Some(ms) = cmd.get_one::<u64>("payload-ms") {
        settings.engine.payload_timeout = Duration::from_millis(*ms);
    }
    if let Some(requests) = cmd.get_many::<String>("mount") {
        for req in requests {
            let (idx,path) = super::parse_mount(req)?;
            if idx >= MAX_DRIVES {
                error!("drive {} is out of range",idx);
                return Err(Box::new(CommandError::OutOfRange));
            }
            if settings.mount.len() <= idx {
                settings.mount.resize(idx + 1,None);
            }
            settings.mount[idx] = Some(path);
        }
    }
    Ok(())
}

/// Gather settings from file and command line
pub fn resolve(cmd: &clap::ArgMatches) -> Result<Settings,DYNERR> {
    let mut ans = match cmd.get_one::<String>("config") {
        Some(path) => settings::parse_file(path)?,
        None => Settings::new()
    };
    apply_args(&mut ans,cmd)?;
    Ok(ans)
}

pub fn serve(cmd: &clap::ArgMatches) -> STDRESULT {
    let settings = resolve(cmd)?;
    let port = match &settings.port {
        Some(port) => port.clone(),
        None => {
            error!("a serial port is needed, use `-p` or the settings file");
            return Err(Box::new(CommandError::NoTransport));
        }
    };
    let table = drive::shared(DriveTable::new(settings.engine.drives));
    for (idx,path) in settings.mount_requests() {
        // a bad image should not keep the others from being served
        if let Err(e) = super::mount_image(&table,idx,&path) {
            error!("could not mount {} in drive {}: {}",path,idx,e);
        }
    }
    let transport = SerialTransport::open(&port,settings.baud)?;
    let mut engine = Engine::new(transport,Arc::clone(&table),settings.engine.clone());
    let stop = Arc::new(AtomicBool::new(false));
    let console = match cmd.get_flag("no-console") {
        true => None,
        false => {
            let console = Console::new(Arc::clone(&table),engine.counters(),Arc::clone(&stop));
            let stop = Arc::clone(&stop);
            Some(std::thread::spawn(move || {
                let stdin = std::io::stdin();
                if let Err(e) = console.run(stdin.lock(),&mut std::io::stdout()) {
                    error!("console failed: {}",e);
                    stop.store(true,Ordering::Relaxed);
                }
            }))
        }
    };
    info!("serving {} drives on {}",settings.engine.drives,port);
    engine.run(&stop);
    engine.transport_mut().close();
    let mut drives = drive::lock(&table);
    for idx in 0..drives.count() {
        if drives.get(idx).map(|d| d.is_mounted()).unwrap_or(false) {
            if let Err(e) = drives.unmount(idx) {
                warn!("{}",e);
            }
        }
    }
    drop(drives);
    if let Some(handle) = console {
        if handle.join().is_err() {
            error!("console thread panicked");
        }
    }
    Ok(())
}
